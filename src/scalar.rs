use std::cmp::Ordering;
use std::fmt;

use crate::error::ConstructionError;

/// A degree of truth or membership between zero and one
///
/// Values that land within [`FuzzyScalar::TOLERANCE`] of either bound snap to the bound exactly,
/// so small floating point drift never turns a valid degree into an error. Equality is
/// tolerance based as well.
#[derive(Clone, Copy, Debug, Default)]
pub struct FuzzyScalar(f64);

impl FuzzyScalar {
    pub const TOLERANCE: f64 = 1e-5;
    pub const ZERO: Self = FuzzyScalar(0.);
    pub const ONE: Self = FuzzyScalar(1.);

    /// Fails unless `value` lies in [0, 1] once snapped.
    pub fn of(value: f64) -> Result<Self, ConstructionError> {
        if value.is_nan() {
            return Err(ConstructionError::OutOfRange(value));
        }

        let snapped = snap(value);

        if (0. ..=1.).contains(&snapped) {
            Ok(FuzzyScalar(snapped))
        } else {
            Err(ConstructionError::OutOfRange(value))
        }
    }

    /// Never fails: out of range values are clamped and NaN becomes zero.
    pub fn try_create(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }

        FuzzyScalar(snap(value).clamp(0., 1.))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.
    }

    pub fn min(self, other: Self) -> Self {
        FuzzyScalar(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        FuzzyScalar(self.0.max(other.0))
    }
}

fn snap(value: f64) -> f64 {
    if value.abs() <= FuzzyScalar::TOLERANCE {
        0.
    } else if (value - 1.).abs() <= FuzzyScalar::TOLERANCE {
        1.
    } else {
        value
    }
}

impl PartialEq for FuzzyScalar {
    fn eq(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() <= Self::TOLERANCE
    }
}

impl PartialOrd for FuzzyScalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else {
            self.0.partial_cmp(&other.0)
        }
    }
}

impl TryFrom<f64> for FuzzyScalar {
    type Error = ConstructionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::of(value)
    }
}

impl From<FuzzyScalar> for f64 {
    fn from(scalar: FuzzyScalar) -> Self {
        scalar.0
    }
}

impl fmt::Display for FuzzyScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[test]
fn test_of_keeps_values_in_range() {
    for v in [0., 0.25, 0.5, 0.75, 1.] {
        assert_eq!(FuzzyScalar::of(v).unwrap().value(), v);
    }
}

#[test]
fn test_of_rejects_values_out_of_range() {
    assert_eq!(FuzzyScalar::of(-0.1), Err(ConstructionError::OutOfRange(-0.1)));
    assert_eq!(FuzzyScalar::of(1.5), Err(ConstructionError::OutOfRange(1.5)));
    assert!(FuzzyScalar::of(f64::NAN).is_err());
}

#[test]
fn test_values_near_bounds_snap() {
    assert_eq!(FuzzyScalar::of(-0.000001).unwrap().value(), 0.);
    assert_eq!(FuzzyScalar::of(1.000001).unwrap().value(), 1.);
    assert_eq!(FuzzyScalar::of(0.999999).unwrap().value(), 1.);
    assert_eq!(FuzzyScalar::try_create(-0.000001).value(), 0.);
    assert_eq!(FuzzyScalar::try_create(1.000001).value(), 1.);
}

#[test]
fn test_try_create_clamps() {
    assert_eq!(FuzzyScalar::try_create(-3.).value(), 0.);
    assert_eq!(FuzzyScalar::try_create(42.).value(), 1.);
    assert_eq!(FuzzyScalar::try_create(f64::NAN).value(), 0.);
}

#[test]
fn test_tolerant_equality() {
    assert_eq!(FuzzyScalar::try_create(0.5), FuzzyScalar::try_create(0.500001));
    assert_ne!(FuzzyScalar::try_create(0.5), FuzzyScalar::try_create(0.51));
    assert!(FuzzyScalar::try_create(0.2) < FuzzyScalar::try_create(0.3));
}
