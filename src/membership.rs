//! Membership function shapes.
//!
//! Every shape is validated once at construction and is immutable afterwards. Besides
//! evaluation, each shape knows its support and core, can be inverted at a given height
//! (alpha-cut), and can report its area and centroid. Triangles and trapezoids use closed
//! polygon formulas; the smooth shapes fall back to adaptive quadrature.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConstructionError;
use crate::math::integrate;
use crate::scalar::FuzzyScalar;

/// A closed interval of the real line. Either end may be infinite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub const REAL_LINE: Interval = Interval {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
    };

    pub fn new(low: f64, high: f64) -> Self {
        Interval { low, high }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.
    }

    pub fn is_bounded(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }

    pub fn encloses(&self, other: &Interval) -> bool {
        self.low <= other.low && other.high <= self.high
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);

        if low <= high {
            Some(Interval { low, high })
        } else {
            None
        }
    }

    /// Moves both ends into `bounds`.
    pub fn clamp_to(&self, bounds: &Interval) -> Interval {
        Interval {
            low: self.low.clamp(bounds.low, bounds.high),
            high: self.high.clamp(bounds.low, bounds.high),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Knobs for the adaptive quadrature used on smooth shapes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Integration {
    /// Largest accepted difference between two successive estimates. Also the relative height
    /// at which decaying tails are truncated.
    pub error_margin: f64,
    /// Upper bound on interval halvings, which bounds the cost of a single integral.
    pub max_refinements: u32,
}

impl Default for Integration {
    fn default() -> Self {
        Integration {
            error_margin: 1e-4,
            max_refinements: 20,
        }
    }
}

/// Area and horizontal centroid of a region under a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub area: f64,
    /// `None` when the area is zero
    pub centroid_x: Option<f64>,
}

impl Geometry {
    pub const EMPTY: Geometry = Geometry {
        area: 0.,
        centroid_x: None,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Triangular { a: f64, b: f64, c: f64 },
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    /// Full height up to `a`, ramping down to zero at `b`
    LeftOpenTrapezoid { a: f64, b: f64 },
    /// Zero up to `a`, ramping up to full height at `b`
    RightOpenTrapezoid { a: f64, b: f64 },
    Gaussian { mean: f64, sigma: f64 },
    GeneralizedBell { a: f64, b: f64, c: f64 },
    Sigmoid { a: f64, c: f64 },
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Triangular { .. } => "triangular",
            Shape::Trapezoidal { .. } => "trapezoidal",
            Shape::LeftOpenTrapezoid { .. } => "left-open trapezoid",
            Shape::RightOpenTrapezoid { .. } => "right-open trapezoid",
            Shape::Gaussian { .. } => "gaussian",
            Shape::GeneralizedBell { .. } => "generalized bell",
            Shape::Sigmoid { .. } => "sigmoid",
        }
    }
}

/// A piecewise linear trapezoid `(a, 0) (b, h) (c, h) (d, 0)`. Triangles have `b == c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Trapezoid {
    pub(crate) a: f64,
    pub(crate) b: f64,
    pub(crate) c: f64,
    pub(crate) d: f64,
    pub(crate) height: f64,
}

impl Trapezoid {
    pub(crate) fn geometry(&self) -> Geometry {
        let Trapezoid { a, b, c, d, height } = *self;
        // Split into rising triangle, plateau rectangle and falling triangle
        let parts = [
            (height * (b - a) / 2., (a + 2. * b) / 3.),
            (height * (c - b), (b + c) / 2.),
            (height * (d - c) / 2., (2. * c + d) / 3.),
        ];
        let area: f64 = parts.iter().map(|(area, _)| area).sum();

        if area <= 0. {
            return Geometry::EMPTY;
        }

        let moment: f64 = parts.iter().map(|(area, x)| area * x).sum();

        Geometry {
            area,
            centroid_x: Some(moment / area),
        }
    }
}

/// A validated shape together with its height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MembershipFunction {
    shape: Shape,
    height: f64,
}

fn finite(params: &[f64]) -> Result<(), ConstructionError> {
    if params.iter().all(|p| p.is_finite()) {
        Ok(())
    } else {
        Err(ConstructionError::NonFinite)
    }
}

fn invalid(shape: &'static str, reason: &'static str) -> ConstructionError {
    ConstructionError::InvalidParameters { shape, reason }
}

impl MembershipFunction {
    fn new(shape: Shape) -> Self {
        MembershipFunction { shape, height: 1. }
    }

    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self, ConstructionError> {
        finite(&[a, b, c])?;

        if !(a <= b && b <= c) {
            return Err(invalid("triangular", "expected a <= b <= c"));
        }
        if a == c {
            return Err(ConstructionError::Degenerate { shape: "triangular" });
        }

        Ok(Self::new(Shape::Triangular { a, b, c }))
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self, ConstructionError> {
        finite(&[a, b, c, d])?;

        if !(a <= b && b <= c && c <= d) {
            return Err(invalid("trapezoidal", "expected a <= b <= c <= d"));
        }
        // A zero-width support or vertical edges on both sides is a point or a rectangle
        if a == d || (a == b && c == d) {
            return Err(ConstructionError::Degenerate { shape: "trapezoidal" });
        }

        Ok(Self::new(Shape::Trapezoidal { a, b, c, d }))
    }

    pub fn left_open_trapezoid(a: f64, b: f64) -> Result<Self, ConstructionError> {
        Self::open_ramp(a, b, "left-open trapezoid")?;

        Ok(Self::new(Shape::LeftOpenTrapezoid { a, b }))
    }

    pub fn right_open_trapezoid(a: f64, b: f64) -> Result<Self, ConstructionError> {
        Self::open_ramp(a, b, "right-open trapezoid")?;

        Ok(Self::new(Shape::RightOpenTrapezoid { a, b }))
    }

    fn open_ramp(a: f64, b: f64, shape: &'static str) -> Result<(), ConstructionError> {
        finite(&[a, b])?;

        if a > b {
            return Err(invalid(shape, "expected a <= b"));
        }
        if a == b {
            return Err(ConstructionError::Degenerate { shape });
        }

        Ok(())
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Result<Self, ConstructionError> {
        finite(&[mean, sigma])?;

        if sigma < 0. {
            return Err(invalid("gaussian", "sigma must be positive"));
        }
        if sigma == 0. {
            return Err(ConstructionError::Degenerate { shape: "gaussian" });
        }

        Ok(Self::new(Shape::Gaussian { mean, sigma }))
    }

    /// `a` is the half width, `b` the sharpness and `c` the center.
    pub fn generalized_bell(a: f64, b: f64, c: f64) -> Result<Self, ConstructionError> {
        finite(&[a, b, c])?;

        if a == 0. {
            return Err(ConstructionError::Degenerate {
                shape: "generalized bell",
            });
        }
        if b < 1. {
            return Err(invalid("generalized bell", "sharpness b must be at least 1"));
        }

        Ok(Self::new(Shape::GeneralizedBell { a, b, c }))
    }

    /// `a` is the slope and `c` the crossover point. A positive slope opens to the right.
    pub fn sigmoid(a: f64, c: f64) -> Result<Self, ConstructionError> {
        finite(&[a, c])?;

        if a == 0. {
            return Err(ConstructionError::Degenerate { shape: "sigmoid" });
        }

        Ok(Self::new(Shape::Sigmoid { a, c }))
    }

    /// Scales the shape down to `height`, which must lie in (0, 1].
    pub fn scaled(self, height: f64) -> Result<Self, ConstructionError> {
        if !(height > 0. && height <= 1.) {
            return Err(ConstructionError::HeightOutOfRange(height));
        }

        Ok(MembershipFunction { height, ..self })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn evaluate(&self, x: f64) -> FuzzyScalar {
        if x.is_nan() {
            return FuzzyScalar::ZERO;
        }

        let h = self.height;
        let mu = match self.shape {
            Shape::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.
                } else if x < b {
                    h * (x - a) / (b - a)
                } else if x == b {
                    h
                } else {
                    h * (c - x) / (c - b)
                }
            },
            Shape::Trapezoidal { a, b, c, d } => {
                if x < a || x > d {
                    0.
                } else if x < b {
                    h * (x - a) / (b - a)
                } else if x <= c {
                    h
                } else {
                    h * (d - x) / (d - c)
                }
            },
            Shape::LeftOpenTrapezoid { a, b } => {
                if x <= a {
                    h
                } else if x >= b {
                    0.
                } else {
                    h * (b - x) / (b - a)
                }
            },
            Shape::RightOpenTrapezoid { a, b } => {
                if x <= a {
                    0.
                } else if x >= b {
                    h
                } else {
                    h * (x - a) / (b - a)
                }
            },
            Shape::Gaussian { mean, sigma } => {
                let z = (x - mean) / sigma;
                h * (-0.5 * z * z).exp()
            },
            Shape::GeneralizedBell { a, b, c } => h / (1. + ((x - c) / a).abs().powf(2. * b)),
            Shape::Sigmoid { a, c } => h / (1. + (-a * (x - c)).exp()),
        };

        FuzzyScalar::try_create(mu)
    }

    /// Membership stays at full height as x goes to negative infinity.
    pub fn is_open_left(&self) -> bool {
        match self.shape {
            Shape::LeftOpenTrapezoid { .. } => true,
            Shape::Sigmoid { a, .. } => a < 0.,
            _ => false,
        }
    }

    /// Membership stays at full height as x goes to positive infinity.
    pub fn is_open_right(&self) -> bool {
        match self.shape {
            Shape::RightOpenTrapezoid { .. } => true,
            Shape::Sigmoid { a, .. } => a > 0.,
            _ => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.is_open_left() && !self.is_open_right()
    }

    pub fn is_symmetric(&self) -> bool {
        let same = |l: f64, r: f64| (l - r).abs() <= 1e-9 * l.abs().max(r.abs()).max(1.);

        match self.shape {
            Shape::Triangular { a, b, c } => same(b - a, c - b),
            Shape::Trapezoidal { a, b, c, d } => same(b - a, d - c),
            Shape::Gaussian { .. } | Shape::GeneralizedBell { .. } => true,
            Shape::LeftOpenTrapezoid { .. } | Shape::RightOpenTrapezoid { .. } | Shape::Sigmoid { .. } => false,
        }
    }

    /// Where membership is non-zero. Smooth shapes never reach zero, so their support is unbounded.
    pub fn support(&self) -> Interval {
        match self.shape {
            Shape::Triangular { a, c, .. } => Interval::new(a, c),
            Shape::Trapezoidal { a, d, .. } => Interval::new(a, d),
            Shape::LeftOpenTrapezoid { b, .. } => Interval::new(f64::NEG_INFINITY, b),
            Shape::RightOpenTrapezoid { a, .. } => Interval::new(a, f64::INFINITY),
            Shape::Gaussian { .. } | Shape::GeneralizedBell { .. } | Shape::Sigmoid { .. } => Interval::REAL_LINE,
        }
    }

    /// Where membership equals one. Only normal shapes (height one) have a core.
    pub fn core(&self) -> Option<Interval> {
        if self.height != 1. {
            return None;
        }

        match self.shape {
            Shape::Triangular { b, .. } => Some(Interval::new(b, b)),
            Shape::Trapezoidal { b, c, .. } => Some(Interval::new(b, c)),
            Shape::LeftOpenTrapezoid { a, .. } => Some(Interval::new(f64::NEG_INFINITY, a)),
            Shape::RightOpenTrapezoid { b, .. } => Some(Interval::new(b, f64::INFINITY)),
            Shape::Gaussian { mean, .. } => Some(Interval::new(mean, mean)),
            Shape::GeneralizedBell { c, .. } => Some(Interval::new(c, c)),
            // Approaches one only asymptotically
            Shape::Sigmoid { .. } => None,
        }
    }

    /// Fraction of the height a cut sits at, or `None` when the cut is above the shape.
    fn relative_cut(&self, cut: FuzzyScalar) -> Option<f64> {
        let cut = cut.value();

        if cut > self.height + FuzzyScalar::TOLERANCE {
            None
        } else {
            Some((cut / self.height).min(1.))
        }
    }

    /// Smallest x with membership at least `cut`.
    pub fn alpha_cut_left(&self, cut: FuzzyScalar) -> Option<f64> {
        self.alpha_cut(cut).map(|interval| interval.low)
    }

    /// Largest x with membership at least `cut`.
    pub fn alpha_cut_right(&self, cut: FuzzyScalar) -> Option<f64> {
        self.alpha_cut(cut).map(|interval| interval.high)
    }

    /// The interval where membership is at least `cut`, by inverting the membership formula.
    pub fn alpha_cut(&self, cut: FuzzyScalar) -> Option<Interval> {
        self.relative_cut(cut).map(|r| self.alpha_cut_at(r))
    }

    /// Alpha-cut at `r` times the height, with `r` in `[0, 1]`. Unlike a `FuzzyScalar`, `r` is
    /// never snapped, so cuts just above zero or just below one stay finite.
    fn alpha_cut_at(&self, r: f64) -> Interval {
        match self.shape {
            Shape::Triangular { a, b, c } => Interval::new(a + r * (b - a), c - r * (c - b)),
            Shape::Trapezoidal { a, b, c, d } => Interval::new(a + r * (b - a), d - r * (d - c)),
            Shape::LeftOpenTrapezoid { a, b } => Interval::new(f64::NEG_INFINITY, b - r * (b - a)),
            Shape::RightOpenTrapezoid { a, b } => Interval::new(a + r * (b - a), f64::INFINITY),
            Shape::Gaussian { mean, sigma } => {
                let spread = sigma * (2. * (1. / r).ln()).sqrt();
                Interval::new(mean - spread, mean + spread)
            },
            Shape::GeneralizedBell { a, b, c } => {
                let spread = a.abs() * ((1. - r) / r).powf(1. / (2. * b));
                Interval::new(c - spread, c + spread)
            },
            Shape::Sigmoid { a, c } => {
                let x = c + (r / (1. - r)).ln() / a;

                if a > 0. {
                    Interval::new(x, f64::INFINITY)
                } else {
                    Interval::new(f64::NEG_INFINITY, x)
                }
            },
        }
    }

    /// A finite window holding the region worth integrating.
    ///
    /// A decaying tail is cut where membership falls to `error_margin` of the height, even
    /// inside `universe`. An open side runs to the universe bound, or without a universe stops
    /// where the shape reaches its plateau. The result always lies within `universe`.
    pub fn integration_window(&self, universe: Option<&Interval>, error_margin: f64) -> Interval {
        let margin = error_margin.clamp(f64::MIN_POSITIVE, 0.5);
        let bounds = universe.copied().unwrap_or(Interval::REAL_LINE);
        let support = self.support();
        let tail = self.alpha_cut_at(margin);
        let plateau = match self.shape {
            Shape::LeftOpenTrapezoid { a, .. } => Interval::new(a, a),
            Shape::RightOpenTrapezoid { b, .. } => Interval::new(b, b),
            _ => self.alpha_cut_at(1. - margin),
        };

        let low = if support.low.is_finite() {
            support.low
        } else if !self.is_open_left() {
            tail.low
        } else if bounds.low.is_finite() {
            bounds.low
        } else {
            plateau.high
        };
        let high = if support.high.is_finite() {
            support.high
        } else if !self.is_open_right() {
            tail.high
        } else if bounds.high.is_finite() {
            bounds.high
        } else {
            plateau.low
        };
        let window = Interval::new(low, high);

        // Disjoint from the universe: collapse onto the nearest bound
        window.intersect(&bounds).unwrap_or_else(|| window.clamp_to(&bounds))
    }

    pub fn area(&self, integration: &Integration) -> f64 {
        self.geometry(None, integration).area
    }

    pub fn centroid_x(&self, integration: &Integration) -> Option<f64> {
        self.geometry(None, integration).centroid_x
    }

    /// Area and centroid over the integration window, optionally bounded by a universe.
    pub fn geometry(&self, universe: Option<&Interval>, integration: &Integration) -> Geometry {
        let window = self.integration_window(universe, integration.error_margin);

        if let Some(polygon) = self.polygon() {
            if window.encloses(&self.support()) {
                return polygon.geometry();
            }
        }

        geometry_of(|x| self.evaluate(x).value(), window, integration, self.shape.name())
    }

    /// The closed polygon for piecewise linear shapes with a bounded support.
    pub(crate) fn polygon(&self) -> Option<Trapezoid> {
        let height = self.height;

        match self.shape {
            Shape::Triangular { a, b, c } => Some(Trapezoid { a, b, c: b, d: c, height }),
            Shape::Trapezoidal { a, b, c, d } => Some(Trapezoid { a, b, c, d, height }),
            _ => None,
        }
    }
}

/// Area and centroid of `f` over a bounded window by adaptive quadrature.
pub(crate) fn geometry_of(
    f: impl Fn(f64) -> f64,
    window: Interval,
    integration: &Integration,
    label: &'static str,
) -> Geometry {
    if !window.is_bounded() || window.width() <= 0. {
        return Geometry::EMPTY;
    }

    let Integration {
        error_margin,
        max_refinements,
    } = *integration;
    let area = integrate(&f, window.low, window.high, error_margin, max_refinements);
    let moment = integrate(|x| x * f(x), window.low, window.high, error_margin, max_refinements);

    if !(area.converged && moment.converged) {
        warn!(
            shape = label,
            low = window.low,
            high = window.high,
            max_refinements,
            "quadrature stopped before reaching the error margin"
        );
    }

    if area.value <= 0. {
        return Geometry::EMPTY;
    }

    Geometry {
        area: area.value,
        centroid_x: Some(moment.value / area.value),
    }
}

impl fmt::Display for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            Shape::Triangular { a, b, c } => write!(f, "triangular({a}, {b}, {c})")?,
            Shape::Trapezoidal { a, b, c, d } => write!(f, "trapezoidal({a}, {b}, {c}, {d})")?,
            Shape::LeftOpenTrapezoid { a, b } => write!(f, "left-open({a}, {b})")?,
            Shape::RightOpenTrapezoid { a, b } => write!(f, "right-open({a}, {b})")?,
            Shape::Gaussian { mean, sigma } => write!(f, "gaussian({mean}, {sigma})")?,
            Shape::GeneralizedBell { a, b, c } => write!(f, "bell({a}, {b}, {c})")?,
            Shape::Sigmoid { a, c } => write!(f, "sigmoid({a}, {c})")?,
        }

        if self.height != 1. {
            write!(f, " x {}", self.height)?;
        }

        Ok(())
    }
}

#[cfg(test)]
fn cut(v: f64) -> FuzzyScalar {
    FuzzyScalar::of(v).unwrap()
}

#[cfg(test)]
fn all_shapes() -> Vec<MembershipFunction> {
    vec![
        MembershipFunction::triangular(0., 5., 10.).unwrap(),
        MembershipFunction::trapezoidal(2., 4., 8., 9.).unwrap(),
        MembershipFunction::left_open_trapezoid(1., 3.).unwrap(),
        MembershipFunction::right_open_trapezoid(1., 3.).unwrap(),
        MembershipFunction::gaussian(5., 2.).unwrap(),
        MembershipFunction::generalized_bell(2., 3., 5.).unwrap(),
        MembershipFunction::sigmoid(2., 5.).unwrap(),
        MembershipFunction::sigmoid(-2., 5.).unwrap(),
        MembershipFunction::gaussian(0., 1.).unwrap().scaled(0.8).unwrap(),
        MembershipFunction::generalized_bell(1., 2., 0.).unwrap().scaled(0.5).unwrap(),
    ]
}

#[test]
fn test_triangular_values() {
    let mf = MembershipFunction::triangular(0., 5., 10.).unwrap();

    assert_eq!(mf.evaluate(0.).value(), 0.);
    assert_eq!(mf.evaluate(5.).value(), 1.);
    assert_eq!(mf.evaluate(10.).value(), 0.);
    assert_eq!(mf.evaluate(2.5).value(), 0.5);
    assert_eq!(mf.evaluate(-1.).value(), 0.);
    assert!(mf.is_symmetric());
    assert!(mf.is_closed());
}

#[test]
fn test_shoulder_triangles() {
    let bad = MembershipFunction::triangular(0., 0., 5.).unwrap();
    let great = MembershipFunction::triangular(5., 10., 10.).unwrap();

    assert_eq!(bad.evaluate(0.).value(), 1.);
    assert_eq!(great.evaluate(10.).value(), 1.);
    assert_eq!(great.evaluate(6.).value(), 0.2);
}

#[test]
fn test_invalid_parameters() {
    assert_eq!(
        MembershipFunction::trapezoidal(2., 4., 8., 4.),
        Err(ConstructionError::InvalidParameters {
            shape: "trapezoidal",
            reason: "expected a <= b <= c <= d"
        })
    );
    assert_eq!(
        MembershipFunction::trapezoidal(2., 2., 8., 8.),
        Err(ConstructionError::Degenerate { shape: "trapezoidal" })
    );
    assert!(MembershipFunction::triangular(3., 3., 3.).is_err());
    assert!(MembershipFunction::triangular(3., 1., 5.).is_err());
    assert!(MembershipFunction::gaussian(0., 0.).is_err());
    assert!(MembershipFunction::generalized_bell(0., 2., 0.).is_err());
    assert!(MembershipFunction::generalized_bell(1., 0.5, 0.).is_err());
    assert!(MembershipFunction::sigmoid(0., 1.).is_err());
    assert!(MembershipFunction::left_open_trapezoid(2., 2.).is_err());
    assert_eq!(MembershipFunction::triangular(0., f64::NAN, 1.), Err(ConstructionError::NonFinite));
}

#[test]
fn test_height_bounds() {
    let mf = MembershipFunction::triangular(0., 1., 2.).unwrap();

    assert_eq!(mf.scaled(0.), Err(ConstructionError::HeightOutOfRange(0.)));
    assert_eq!(mf.scaled(1.2), Err(ConstructionError::HeightOutOfRange(1.2)));

    let scaled = mf.scaled(0.5).unwrap();

    assert_eq!(scaled.evaluate(1.).value(), 0.5);
    assert_eq!(scaled.core(), None);
    assert_eq!(scaled.alpha_cut(cut(0.6)), None);
}

#[test]
fn test_openness() {
    let left = MembershipFunction::left_open_trapezoid(1., 3.).unwrap();
    let rising = MembershipFunction::sigmoid(1., 0.).unwrap();

    assert!(left.is_open_left() && !left.is_open_right());
    assert!(rising.is_open_right() && !rising.is_open_left());
    assert!(MembershipFunction::gaussian(0., 1.).unwrap().is_closed());
    assert_eq!(left.evaluate(-1e9).value(), 1.);
    assert_eq!(left.support(), Interval::new(f64::NEG_INFINITY, 3.));
    assert_eq!(left.core(), Some(Interval::new(f64::NEG_INFINITY, 1.)));
}

#[test]
fn test_alpha_cut_inverts_membership() {
    for mf in all_shapes() {
        for alpha in [0.1, 0.25, 0.5, 0.75] {
            let alpha = alpha * mf.height();
            let interval = mf.alpha_cut(cut(alpha)).unwrap();

            for x in [interval.low, interval.high] {
                if x.is_finite() {
                    assert!((mf.evaluate(x).value() - alpha).abs() < 1e-9, "{mf} at {x}");
                }
            }
        }
    }
}

#[test]
fn test_alpha_cut_closed_forms() {
    let tri = MembershipFunction::triangular(0., 5., 10.).unwrap();
    let trap = MembershipFunction::trapezoidal(2., 4., 8., 9.).unwrap();
    let gauss = MembershipFunction::gaussian(0., 1.).unwrap();

    assert_eq!(tri.alpha_cut(cut(0.5)), Some(Interval::new(2.5, 7.5)));
    assert_eq!(trap.alpha_cut_left(cut(0.5)), Some(3.));
    assert_eq!(trap.alpha_cut_right(cut(0.5)), Some(8.5));
    assert_eq!(gauss.alpha_cut(cut(1.)), Some(Interval::new(0., 0.)));
}

#[test]
fn test_polygon_geometry() {
    let close = |x: f64, y: f64| (x - y).abs() < 1e-12;
    let integration = Integration::default();
    let tri = MembershipFunction::triangular(0., 5., 10.).unwrap();
    let skewed = MembershipFunction::triangular(0., 0., 6.).unwrap();
    let trap = MembershipFunction::trapezoidal(0., 2., 4., 6.).unwrap().scaled(0.5).unwrap();

    assert!(close(tri.area(&integration), 5.));
    assert!(close(tri.centroid_x(&integration).unwrap(), 5.));
    assert!(close(skewed.centroid_x(&integration).unwrap(), 2.));
    assert!(close(trap.area(&integration), 2.));
    assert!(close(trap.centroid_x(&integration).unwrap(), 3.));
}

#[test]
fn test_smooth_geometry() {
    let integration = Integration {
        error_margin: 1e-6,
        max_refinements: 24,
    };
    let gauss = MembershipFunction::gaussian(3., 2.).unwrap();
    let geometry = gauss.geometry(None, &integration);
    let expected = 2. * (2. * std::f64::consts::PI).sqrt();

    assert!((geometry.area - expected).abs() < 1e-3, "{}", geometry.area);
    assert!((geometry.centroid_x.unwrap() - 3.).abs() < 1e-6);

    let bell = MembershipFunction::generalized_bell(1., 2., -4.).unwrap();

    assert!((bell.centroid_x(&integration).unwrap() + 4.).abs() < 1e-6);
}

#[test]
fn test_universe_bounds_open_shapes() {
    let high = MembershipFunction::right_open_trapezoid(10., 20.).unwrap();
    let universe = Interval::new(0., 30.);
    let geometry = high.geometry(Some(&universe), &Integration::default());

    // ramp area 5 plus plateau area 10
    assert!((geometry.area - 15.).abs() < 1e-3, "{}", geometry.area);
    assert_eq!(high.integration_window(None, 1e-4), Interval::new(10., 20.));
}

#[test]
fn test_window_is_finite_at_tight_margins() {
    for mf in all_shapes() {
        for margin in [1e-4, 1e-5, 1e-7, 1e-12] {
            let window = mf.integration_window(None, margin);

            assert!(window.is_bounded() && window.width() > 0., "{mf} at {margin}: {window}");
        }
    }
}

#[test]
fn test_window_truncates_tails_inside_universe() {
    let narrow = MembershipFunction::gaussian(50., 1.).unwrap();
    let universe = Interval::new(0., 1000.);
    let window = narrow.integration_window(Some(&universe), 1e-4);
    let spread = (2. * 1e4f64.ln()).sqrt();

    assert!((window.low - (50. - spread)).abs() < 1e-9, "{window}");
    assert!((window.high - (50. + spread)).abs() < 1e-9, "{window}");

    let geometry = narrow.geometry(Some(&universe), &Integration::default());

    assert!((geometry.area - (2. * std::f64::consts::PI).sqrt()).abs() < 1e-3, "{}", geometry.area);
    assert!((geometry.centroid_x.unwrap() - 50.).abs() < 1e-6);

    // The open side keeps its plateau up to the universe bound
    let rising = MembershipFunction::sigmoid(0.5, 50.).unwrap();
    let window = rising.integration_window(Some(&Interval::new(0., 100.)), 1e-5);

    assert!(window.contains(30.) && !window.contains(20.), "{window}");
    assert_eq!(window.high, 100.);

    // A peak far outside the universe leaves nothing to integrate
    let window = narrow.integration_window(Some(&Interval::new(500., 600.)), 1e-4);

    assert_eq!(window, Interval::new(500., 500.));
    assert_eq!(narrow.geometry(Some(&Interval::new(500., 600.)), &Integration::default()), Geometry::EMPTY);
}

#[test]
fn test_interval_intersection() {
    let a = Interval::new(0., 10.);

    assert_eq!(a.intersect(&Interval::new(5., 20.)), Some(Interval::new(5., 10.)));
    assert_eq!(a.intersect(&Interval::new(11., 20.)), None);
    assert_eq!(a.intersect(&Interval::REAL_LINE), Some(a));
    assert!(a.contains(0.) && a.contains(10.) && !a.contains(10.5));
}
