use tracing::trace;

use crate::dsl::{Literal, Proposition};
use crate::membership::{geometry_of, Geometry, Integration, Interval, Trapezoid};
use crate::ops::{DefuzzificationMethod, ImplicationMethod, Negation};
use crate::rulebase::RuleKey;
use crate::scalar::FuzzyScalar;

/// A rule's consequent after implication: cut at (Mamdani) or scaled by (Larsen) the rule's
/// firing strength, restricted to a finite window.
#[derive(Clone, Debug)]
pub struct ClippedRegion<'r> {
    rule: RuleKey,
    consequent: &'r Proposition,
    strength: FuzzyScalar,
    implication: ImplicationMethod,
    negation: Negation,
    window: Interval,
    geometry: Geometry,
}

impl<'r> ClippedRegion<'r> {
    pub(crate) fn new(
        rule: RuleKey,
        consequent: &'r Proposition,
        strength: FuzzyScalar,
        implication: ImplicationMethod,
        negation: Negation,
        integration: &Integration,
    ) -> Self {
        let window = consequent
            .function()
            .integration_window(consequent.universe(), integration.error_margin);
        let mut region = ClippedRegion {
            rule,
            consequent,
            strength,
            implication,
            negation,
            window,
            geometry: Geometry::EMPTY,
        };

        region.geometry = region.measure(integration);

        trace!(
            consequent = %consequent,
            strength = strength.value(),
            area = region.geometry.area,
            centroid = ?region.geometry.centroid_x,
            "clipped consequent"
        );

        region
    }

    pub fn rule(&self) -> RuleKey {
        self.rule
    }

    pub fn consequent(&self) -> &'r Proposition {
        self.consequent
    }

    pub fn strength(&self) -> FuzzyScalar {
        self.strength
    }

    pub fn window(&self) -> Interval {
        self.window
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// A bare `variable IS term` consequent, with no hedge and no negation.
    fn is_plain(&self) -> bool {
        self.consequent.literal() == Literal::Is && self.consequent.hedge().is_none()
    }

    /// Height of the clipped region at `x`.
    pub fn membership(&self, x: f64) -> f64 {
        let mu = self.consequent.degree(x, self.negation).value();
        let alpha = self.strength.value();

        match self.implication {
            ImplicationMethod::MamdaniMinimum => mu.min(alpha),
            ImplicationMethod::LarsenProduct => alpha * mu,
        }
    }

    fn measure(&self, integration: &Integration) -> Geometry {
        let alpha = self.strength.value();

        if alpha == 0. {
            return Geometry::EMPTY;
        }

        let function = self.consequent.function();

        if self.is_plain() {
            if let Some(polygon) = function.polygon().filter(|_| self.window.encloses(&function.support())) {
                match self.implication {
                    ImplicationMethod::LarsenProduct => {
                        return Trapezoid {
                            height: polygon.height * alpha,
                            ..polygon
                        }
                        .geometry();
                    },
                    ImplicationMethod::MamdaniMinimum if alpha >= polygon.height => return polygon.geometry(),
                    ImplicationMethod::MamdaniMinimum => {
                        if let Some(cut) = function.alpha_cut(self.strength) {
                            return Trapezoid {
                                b: cut.low,
                                c: cut.high,
                                height: alpha,
                                ..polygon
                            }
                            .geometry();
                        }
                    },
                }
            }

            if self.implication == ImplicationMethod::LarsenProduct {
                let base = function.geometry(self.consequent.universe(), integration);

                return Geometry {
                    area: base.area * alpha,
                    centroid_x: base.centroid_x,
                };
            }
        }

        geometry_of(|x| self.membership(x), self.window, integration, function.shape().name())
    }

    /// Where the clipped region reaches its maximum, kept inside the window.
    ///
    /// `None` for an empty region or a negated consequent, whose maxima lie outside the term.
    pub fn maxima(&self) -> Option<Interval> {
        if self.strength.is_zero() || self.consequent.literal() == Literal::IsNot {
            return None;
        }

        let function = self.consequent.function();
        let hedge = self.consequent.hedge();
        let height = FuzzyScalar::try_create(function.height());
        let peak = hedge.map_or(height, |hedge| hedge.call(height));
        let level = match self.implication {
            ImplicationMethod::MamdaniMinimum => self.strength.min(peak),
            ImplicationMethod::LarsenProduct => peak,
        };
        let cut = hedge.map_or(level, |hedge| hedge.inverse(level));

        function.alpha_cut(cut).map(|interval| interval.clamp_to(&self.window))
    }

    /// Middle of the consequent's plateau, ignoring the firing strength.
    pub fn peak(&self) -> Option<f64> {
        if self.consequent.literal() == Literal::IsNot {
            return None;
        }

        let function = self.consequent.function();

        function
            .alpha_cut(FuzzyScalar::try_create(function.height()))
            .map(|interval| interval.clamp_to(&self.window).midpoint())
    }
}

/// First region with the largest positive weight.
fn heaviest<'a, 'r>(
    regions: &'a [ClippedRegion<'r>],
    weight: impl Fn(&ClippedRegion<'r>) -> f64,
) -> Option<&'a ClippedRegion<'r>> {
    let mut best: Option<(&ClippedRegion<'r>, f64)> = None;

    for region in regions {
        let w = weight(region);

        if w > best.map_or(0., |(_, bw)| bw) {
            best = Some((region, w));
        }
    }

    best.map(|(region, _)| region)
}

impl DefuzzificationMethod {
    /// Crisp value of the clipped regions, or `None` when they carry no weight.
    pub fn call(self, regions: &[ClippedRegion<'_>]) -> Option<f64> {
        match self {
            Self::Height => {
                let (num, den) = regions
                    .iter()
                    .filter_map(|region| region.peak().map(|peak| (region.strength.value(), peak)))
                    .fold((0., 0.), |(num, den), (weight, peak)| (num + weight * peak, den + weight));

                if den > 0. {
                    Some(num / den)
                } else {
                    None
                }
            },
            Self::FirstOfMaxima | Self::LastOfMaxima | Self::MeanOfMaxima => {
                let maxima = heaviest(regions, |region| region.strength.value())?.maxima()?;

                Some(match self {
                    Self::FirstOfMaxima => maxima.low,
                    Self::LastOfMaxima => maxima.high,
                    _ => maxima.midpoint(),
                })
            },
            // Only the largest region counts, not the union of every fired rule
            Self::CentreOfGravity | Self::CentreOfArea => {
                heaviest(regions, |region| region.geometry.area)?.geometry.centroid_x
            },
            Self::CentreOfSums => {
                let (moment, area) = regions
                    .iter()
                    .filter_map(|region| {
                        let Geometry { area, centroid_x } = region.geometry;

                        centroid_x.map(|x| (area * x, area))
                    })
                    .fold((0., 0.), |(moment, total), (m, a)| (moment + m, total + a));

                if area > 0. {
                    Some(moment / area)
                } else {
                    None
                }
            },
        }
    }
}

#[cfg(test)]
fn tip() -> crate::variable::LinguisticVariable {
    let mut tip = crate::variable::LinguisticVariable::new("tip").unwrap();

    tip.triangular("low", 0., 0., 13.)
        .unwrap()
        .triangular("medium", 0., 13., 25.)
        .unwrap()
        .triangular("high", 13., 25., 35.)
        .unwrap()
        .gaussian("around", 10., 2.)
        .unwrap()
        .triangular("middling", 0., 5., 10.)
        .unwrap();
    tip
}

#[cfg(test)]
fn clip<'r>(consequent: &'r Proposition, alpha: f64, implication: ImplicationMethod) -> ClippedRegion<'r> {
    ClippedRegion::new(
        RuleKey::default(),
        consequent,
        FuzzyScalar::of(alpha).unwrap(),
        implication,
        Negation::Standard,
        &Integration {
            error_margin: 1e-7,
            max_refinements: 24,
        },
    )
}

#[cfg(test)]
fn close(x: f64, y: f64, tolerance: f64) -> bool {
    (x - y).abs() <= tolerance
}

#[test]
fn test_mamdani_cuts_horizontally() {
    let high = tip().is("high").unwrap();
    let region = clip(&high, 0.96, ImplicationMethod::MamdaniMinimum);
    let geometry = region.geometry();

    assert!(close(geometry.area, 10.9824, 1e-9));
    assert!(close(geometry.centroid_x.unwrap(), 24.332308, 1e-6));
    assert_eq!(region.membership(25.), 0.96);
    assert_eq!(region.membership(19.), 0.5);
}

#[test]
fn test_larsen_scales_vertically() {
    let high = tip().is("high").unwrap();
    let region = clip(&high, 0.5, ImplicationMethod::LarsenProduct);
    let geometry = region.geometry();

    assert!(close(geometry.area, 5.5, 1e-9));
    assert!(close(geometry.centroid_x.unwrap(), 73. / 3., 1e-9));
    assert_eq!(region.membership(25.), 0.5);
    assert_eq!(region.maxima(), Some(Interval::new(25., 25.)));
}

#[test]
fn test_polygon_and_quadrature_agree() {
    let middling = tip().is("middling").unwrap();
    let hedged = middling.clone().with_hedge(crate::ops::Hedge::Very);
    let exact = clip(&middling, 0.5, ImplicationMethod::MamdaniMinimum).geometry();
    // Hedged consequents go through quadrature
    let numeric = clip(&hedged, 1., ImplicationMethod::MamdaniMinimum).geometry();

    assert!(close(exact.area, 3.75, 1e-9));
    assert!(close(exact.centroid_x.unwrap(), 5., 1e-9));
    assert!(close(numeric.area, 10. / 3., 1e-5));
    assert!(close(numeric.centroid_x.unwrap(), 5., 1e-5));
}

#[test]
fn test_smooth_consequent() {
    let around = tip().is("around").unwrap();
    let region = clip(&around, 0.5, ImplicationMethod::MamdaniMinimum);

    assert!(close(region.geometry().centroid_x.unwrap(), 10., 1e-6));

    let maxima = region.maxima().unwrap();

    assert!(close(maxima.midpoint(), 10., 1e-9));
    assert!(close(maxima.low, 10. - 2. * (2. * 2f64.ln()).sqrt(), 1e-9));
}

#[test]
fn test_maxima_methods() {
    let middling = tip().is("middling").unwrap();
    let low = tip().is("low").unwrap();
    let regions = [
        clip(&low, 0.2, ImplicationMethod::MamdaniMinimum),
        clip(&middling, 0.5, ImplicationMethod::MamdaniMinimum),
        clip(&low, 0.5, ImplicationMethod::MamdaniMinimum),
    ];

    assert_eq!(DefuzzificationMethod::FirstOfMaxima.call(&regions), Some(2.5));
    assert_eq!(DefuzzificationMethod::LastOfMaxima.call(&regions), Some(7.5));
    assert_eq!(DefuzzificationMethod::MeanOfMaxima.call(&regions), Some(5.));
}

#[test]
fn test_centre_of_gravity_uses_largest_region_only() {
    let low = tip().is("low").unwrap();
    let high = tip().is("high").unwrap();
    let regions = [
        clip(&low, 0.4, ImplicationMethod::MamdaniMinimum),
        clip(&high, 0.8, ImplicationMethod::MamdaniMinimum),
    ];
    let largest = regions[1].geometry();
    let smaller = regions[0].geometry();
    let cog = DefuzzificationMethod::CentreOfGravity.call(&regions).unwrap();
    let union = (largest.area * largest.centroid_x.unwrap() + smaller.area * smaller.centroid_x.unwrap())
        / (largest.area + smaller.area);

    assert_eq!(Some(cog), largest.centroid_x);
    assert_eq!(DefuzzificationMethod::CentreOfArea.call(&regions), Some(cog));
    // A textbook centroid of the union would land elsewhere
    assert!((cog - union).abs() > 1.);
    assert!(close(DefuzzificationMethod::CentreOfSums.call(&regions).unwrap(), union, 1e-9));
}

#[test]
fn test_height_method() {
    let low = tip().is("low").unwrap();
    let high = tip().is("high").unwrap();
    let regions = [
        clip(&low, 0.25, ImplicationMethod::MamdaniMinimum),
        clip(&high, 0.75, ImplicationMethod::LarsenProduct),
    ];

    assert_eq!(DefuzzificationMethod::Height.call(&regions), Some(0.25 * 0. + 0.75 * 25.));
}

#[test]
fn test_zero_weight_is_inconclusive() {
    let low = tip().is("low").unwrap();
    let regions = [
        clip(&low, 0., ImplicationMethod::MamdaniMinimum),
        clip(&low, 0., ImplicationMethod::LarsenProduct),
    ];

    for method in DefuzzificationMethod::ALL {
        assert_eq!(method.call(&regions), None, "{method}");
    }
    assert_eq!(DefuzzificationMethod::CentreOfSums.call(&[]), None);
}
