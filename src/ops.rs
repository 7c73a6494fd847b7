use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use fixed_map::Key;
use serde::{Deserialize, Serialize};

use crate::error::UnknownName;
use crate::scalar::FuzzyScalar;

/// Declares a closed catalog of named operators: the enum itself plus token and display name
/// lookups. Tokens match exactly; display names match case-insensitively.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident: $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => ($token:literal, $display:literal),)+
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            pub fn token(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $(Self::$variant => $display,)+
                }
            }

            pub fn from_token(token: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|op| op.token() == token)
            }

            pub fn from_display_name(name: &str) -> Option<Self> {
                let name = name.to_lowercase();

                Self::ALL
                    .iter()
                    .copied()
                    .find(|op| op.display_name().to_lowercase() == name)
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_token(s)
                    .or_else(|| Self::from_display_name(s))
                    .ok_or_else(|| UnknownName {
                        catalog: $label,
                        name: s.to_owned(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        }
    };
}

catalog! {
    /// Fuzzy complement. Every member maps 0 to 1 and 1 to 0.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Negation: "negation" {
        #[default]
        Standard => ("std", "Standard"),
        RaisedCosine => ("cos", "Raised Cosine"),
        Yager => ("yager", "Yager"),
    }
}

impl Negation {
    pub fn call(self, x: FuzzyScalar) -> FuzzyScalar {
        let x = x.value();
        let y = match self {
            Self::Standard => 1. - x,
            Self::RaisedCosine => (1. + (PI * x).cos()) / 2.,
            Self::Yager => (1. - x * x).sqrt(),
        };

        FuzzyScalar::try_create(y)
    }
}

catalog! {
    /// And operator method for combining the propositions of a rule premise.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TNorm: "t-norm" {
        #[default]
        Minimum => ("min", "Minimum"),
        Product => ("prod", "Product"),
        Lukasiewicz => ("luk", "Łukasiewicz"),
        NilpotentMinimum => ("nmin", "Nilpotent Minimum"),
        Drastic => ("drastic", "Drastic Product"),
    }
}

impl TNorm {
    pub fn call(self, x: FuzzyScalar, y: FuzzyScalar) -> FuzzyScalar {
        let (u, v) = (x.value(), y.value());
        let z = match self {
            Self::Minimum => u.min(v),
            Self::Product => u * v,
            Self::Lukasiewicz => f64::max(0., u + v - 1.),
            Self::NilpotentMinimum => {
                if u + v > 1. {
                    u.min(v)
                } else {
                    0.
                }
            },
            Self::Drastic => {
                if u == 1. {
                    v
                } else if v == 1. {
                    u
                } else {
                    0.
                }
            },
        };

        FuzzyScalar::try_create(z)
    }
}

catalog! {
    /// Or operator method for combining the propositions of a rule premise.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TConorm: "t-conorm" {
        #[default]
        Maximum => ("max", "Maximum"),
        ProbabilisticSum => ("psum", "Probabilistic Sum"),
        Lukasiewicz => ("luk", "Łukasiewicz"),
        NilpotentMaximum => ("nmax", "Nilpotent Maximum"),
        Drastic => ("drastic", "Drastic Sum"),
    }
}

impl TConorm {
    pub fn call(self, x: FuzzyScalar, y: FuzzyScalar) -> FuzzyScalar {
        let (u, v) = (x.value(), y.value());
        let z = match self {
            Self::Maximum => u.max(v),
            Self::ProbabilisticSum => u + v - u * v,
            Self::Lukasiewicz => f64::min(1., u + v),
            Self::NilpotentMaximum => {
                if u + v < 1. {
                    u.max(v)
                } else {
                    1.
                }
            },
            Self::Drastic => {
                if u == 0. {
                    v
                } else if v == 0. {
                    u
                } else {
                    1.
                }
            },
        };

        FuzzyScalar::try_create(z)
    }
}

catalog! {
    /// Implication operator modelling "IF x THEN y".
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Residuum: "residuum" {
        #[default]
        Godel => ("godel", "Gödel"),
        Goguen => ("goguen", "Goguen"),
        Lukasiewicz => ("luk", "Łukasiewicz"),
        KleeneDienes => ("kd", "Kleene-Dienes"),
        Reichenbach => ("reichenbach", "Reichenbach"),
        Wu => ("wu", "Wu"),
        Zadeh => ("zadeh", "Zadeh"),
    }
}

impl Residuum {
    pub fn call(self, x: FuzzyScalar, y: FuzzyScalar) -> FuzzyScalar {
        let (u, v) = (x.value(), y.value());
        let z = match self {
            Self::Godel => {
                if u <= v {
                    1.
                } else {
                    v
                }
            },
            Self::Goguen => {
                if u <= v {
                    1.
                } else {
                    v / u
                }
            },
            Self::Lukasiewicz => f64::min(1., 1. - u + v),
            Self::KleeneDienes => f64::max(1. - u, v),
            Self::Reichenbach => 1. - u + u * v,
            Self::Wu => {
                if u <= v {
                    1.
                } else {
                    f64::min(1. - u, v)
                }
            },
            Self::Zadeh => f64::max(u.min(v), 1. - u),
        };

        FuzzyScalar::try_create(z)
    }
}

catalog! {
    /// Canonical fuzzy logics, each fixing a negation, t-norm, t-conorm and residuum.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Family: "family" {
        #[default]
        Godel => ("godel", "Gödel"),
        Product => ("product", "Product"),
        Lukasiewicz => ("luk", "Łukasiewicz"),
        Nilpotent => ("nilpotent", "Nilpotent"),
    }
}

impl Family {
    pub fn algebra(self) -> Algebra {
        let (tnorm, tconorm, residuum) = match self {
            Self::Godel => (TNorm::Minimum, TConorm::Maximum, Residuum::Godel),
            Self::Product => (TNorm::Product, TConorm::ProbabilisticSum, Residuum::Goguen),
            Self::Lukasiewicz => (TNorm::Lukasiewicz, TConorm::Lukasiewicz, Residuum::Lukasiewicz),
            // The Fodor implication is not part of the residuum catalog; Kleene-Dienes is its closest member.
            Self::Nilpotent => (TNorm::NilpotentMinimum, TConorm::NilpotentMaximum, Residuum::KleeneDienes),
        };

        Algebra {
            negation: Negation::Standard,
            tnorm,
            tconorm,
            residuum,
        }
    }
}

/// The operators a rule premise is evaluated with.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Algebra {
    pub negation: Negation,
    pub tnorm: TNorm,
    pub tconorm: TConorm,
    pub residuum: Residuum,
}

catalog! {
    /// Linguistic hedges sharpen or soften a membership degree.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Hedge: "hedge" {
        Very => ("very", "Very"),
        Extremely => ("extremely", "Extremely"),
        Somewhat => ("somewhat", "Somewhat"),
        Slightly => ("slightly", "Slightly"),
    }
}

impl Hedge {
    pub fn call(self, x: FuzzyScalar) -> FuzzyScalar {
        let x = x.value();
        let y = match self {
            Self::Very => x * x,
            Self::Extremely => x * x * x,
            Self::Somewhat => x.sqrt(),
            Self::Slightly => x.cbrt(),
        };

        FuzzyScalar::try_create(y)
    }

    /// The membership degree a hedged degree `y` came from. Hedges are monotone, so this is exact.
    pub fn inverse(self, y: FuzzyScalar) -> FuzzyScalar {
        let y = y.value();
        let x = match self {
            Self::Very => y.sqrt(),
            Self::Extremely => y.cbrt(),
            Self::Somewhat => y * y,
            Self::Slightly => y * y * y,
        };

        FuzzyScalar::try_create(x)
    }
}

catalog! {
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Connective: "connective" {
        And => ("and", "AND"),
        Or => ("or", "OR"),
    }
}

impl Connective {
    pub fn call(self, algebra: &Algebra, x: FuzzyScalar, y: FuzzyScalar) -> FuzzyScalar {
        match self {
            Self::And => algebra.tnorm.call(x, y),
            Self::Or => algebra.tconorm.call(x, y),
        }
    }
}

catalog! {
    /// How a rule's firing strength shapes its consequent.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ImplicationMethod: "implication method" {
        /// Horizontal cut at the firing strength
        #[default]
        MamdaniMinimum => ("mamdani", "Mamdani Minimum"),
        /// Vertical scaling by the firing strength
        LarsenProduct => ("larsen", "Larsen Product"),
    }
}

catalog! {
    /// Method for turning the clipped consequents into one crisp value.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, Key, PartialEq, Deserialize, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DefuzzificationMethod: "defuzzification method" {
        /// Firing-strength weighted mean of the consequent peaks
        Height => ("height", "Height"),
        /// Smallest value for which the strongest consequent is maximal
        FirstOfMaxima => ("fom", "First of Maxima"),
        /// Largest value for which the strongest consequent is maximal
        LastOfMaxima => ("lom", "Last of Maxima"),
        /// Mean of the values for which the strongest consequent is maximal
        MeanOfMaxima => ("mom", "Mean of Maxima"),
        /// Centroid of the largest clipped consequent
        #[default]
        CentreOfGravity => ("cog", "Centre of Gravity"),
        /// Area weighted mean of all clipped consequent centroids
        CentreOfSums => ("cos", "Centre of Sums"),
        /// Centroid of the largest clipped consequent
        CentreOfArea => ("coa", "Centre of Area"),
    }
}

#[cfg(test)]
fn scalar(v: f64) -> FuzzyScalar {
    FuzzyScalar::of(v).unwrap()
}

#[test]
fn test_negations_swap_bounds() {
    for op in Negation::ALL {
        assert_eq!(op.call(FuzzyScalar::ZERO), FuzzyScalar::ONE, "{op}");
        assert_eq!(op.call(FuzzyScalar::ONE), FuzzyScalar::ZERO, "{op}");
    }

    assert_eq!(Negation::Standard.call(scalar(0.25)), scalar(0.75));
    assert_eq!(Negation::RaisedCosine.call(scalar(0.5)), scalar(0.5));
}

#[test]
fn test_norm_identities() {
    for x in [0., 0.3, 0.7, 1.] {
        for op in TNorm::ALL {
            assert_eq!(op.call(scalar(x), FuzzyScalar::ONE), scalar(x), "{op}");
        }
        for op in TConorm::ALL {
            assert_eq!(op.call(scalar(x), FuzzyScalar::ZERO), scalar(x), "{op}");
        }
    }
}

#[test]
fn test_norms_are_associative_and_commutative() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let (x, y, z) = (scalar(rng.gen()), scalar(rng.gen()), scalar(rng.gen()));

        for op in TNorm::ALL {
            assert_eq!(op.call(x, op.call(y, z)), op.call(op.call(x, y), z), "{op} {x} {y} {z}");
            assert_eq!(op.call(x, y), op.call(y, x), "{op} {x} {y}");
        }
        for op in TConorm::ALL {
            assert_eq!(op.call(x, op.call(y, z)), op.call(op.call(x, y), z), "{op} {x} {y} {z}");
            assert_eq!(op.call(x, y), op.call(y, x), "{op} {x} {y}");
        }
    }
}

#[test]
fn test_residua() {
    let (x, y) = (scalar(0.8), scalar(0.4));

    assert_eq!(Residuum::Godel.call(x, y), scalar(0.4));
    assert_eq!(Residuum::Goguen.call(x, y), scalar(0.5));
    assert_eq!(Residuum::Lukasiewicz.call(x, y), scalar(0.6));
    assert_eq!(Residuum::KleeneDienes.call(x, y), scalar(0.4));
    assert_eq!(Residuum::Reichenbach.call(x, y), scalar(0.52));
    assert_eq!(Residuum::Wu.call(x, y), scalar(0.2));
    assert_eq!(Residuum::Zadeh.call(x, y), scalar(0.4));

    for op in [Residuum::Godel, Residuum::Goguen, Residuum::Lukasiewicz, Residuum::Wu] {
        assert_eq!(op.call(y, x), FuzzyScalar::ONE, "{op}");
    }
}

#[test]
fn test_lookup_by_token_and_display_name() {
    assert_eq!(TNorm::from_token("prod"), Some(TNorm::Product));
    assert_eq!(TNorm::from_display_name("nilpotent minimum"), Some(TNorm::NilpotentMinimum));
    assert_eq!("ŁUKASIEWICZ".parse::<Residuum>(), Ok(Residuum::Lukasiewicz));
    assert_eq!("cog".parse::<DefuzzificationMethod>(), Ok(DefuzzificationMethod::CentreOfGravity));

    let err = "median".parse::<TConorm>().unwrap_err();

    assert_eq!(err.catalog, "t-conorm");
    assert_eq!(err.to_string(), "unknown t-conorm `median`");
}

#[test]
fn test_family_presets() {
    let algebra = Family::Product.algebra();

    assert_eq!(algebra.tnorm, TNorm::Product);
    assert_eq!(algebra.tconorm, TConorm::ProbabilisticSum);
    assert_eq!(algebra.residuum, Residuum::Goguen);
    assert_eq!(Family::default().algebra(), Algebra::default());
}

#[test]
fn test_hedges() {
    assert_eq!(Hedge::Very.call(scalar(0.5)), scalar(0.25));
    assert_eq!(Hedge::Somewhat.call(scalar(0.25)), scalar(0.5));
    assert_eq!(Hedge::Extremely.call(scalar(0.5)), scalar(0.125));

    for hedge in Hedge::ALL {
        assert_eq!(hedge.inverse(hedge.call(scalar(0.3))), scalar(0.3), "{hedge}");
    }
}
