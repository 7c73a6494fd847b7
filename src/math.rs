use num::Float;

use crate::linspace::Linspace;

/// Halvings performed before convergence is even considered, so a narrow peak between the
/// first few samples can't fool the estimate.
const MIN_REFINEMENTS: u32 = 4;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Integral<F> {
    pub(crate) value: F,
    pub(crate) converged: bool,
}

/// Adaptive trapezoidal rule over `[low, high]`.
///
/// The interval count doubles on each refinement, reusing every previous sample, until two
/// successive estimates differ by at most `error_margin` or `max_refinements` is reached.
pub(crate) fn integrate<F: Float>(
    f: impl Fn(F) -> F,
    low: F,
    high: F,
    error_margin: F,
    max_refinements: u32,
) -> Integral<F> {
    if !(high > low) {
        return Integral {
            value: F::zero(),
            converged: true,
        };
    }

    let two = F::one() + F::one();
    let mut width = high - low;
    let mut estimate = width * (f(low) + f(high)) / two;
    let mut intervals = 1usize;

    for refinement in 1..=max_refinements {
        width = width / two;

        // The new samples are the midpoints of the previous intervals
        let midpoints = Linspace::new(low + width, width * two, intervals);
        let sum = midpoints.fold(F::zero(), |acc, x| acc + f(x));
        let refined = estimate / two + width * sum;
        let delta = (refined - estimate).abs();

        estimate = refined;
        intervals *= 2;

        if refinement >= MIN_REFINEMENTS && delta <= error_margin {
            return Integral {
                value: estimate,
                converged: true,
            };
        }
    }

    Integral {
        value: estimate,
        converged: false,
    }
}

#[test]
fn test_integrate_polynomial() {
    let integral = integrate(|x: f64| x * x, 0., 3., 1e-6, 24);

    assert!(integral.converged);
    assert!((integral.value - 9.).abs() < 1e-5);
}

#[test]
fn test_integrate_gaussian() {
    let integral = integrate(|x: f64| (-0.5 * x * x).exp(), -10., 10., 1e-8, 24);

    assert!(integral.converged);
    assert!((integral.value - (2. * std::f64::consts::PI).sqrt()).abs() < 1e-6);
}

#[test]
fn test_integrate_hits_refinement_cap() {
    let integral = integrate(|x: f64| (50. * x).sin().abs(), 0., 10., 1e-12, 3);

    assert!(!integral.converged);
}

#[test]
fn test_integrate_empty_interval() {
    let integral = integrate(|_: f64| 1., 2., 2., 1e-4, 10);

    assert_eq!(integral.value, 0.);
    assert!(integral.converged);
}
