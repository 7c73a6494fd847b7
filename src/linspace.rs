use num::Float;

/// Evenly spaced samples `start, start + step, ...`, `len` of them.
pub(crate) struct Linspace<F> {
    start: F,
    step: F,
    offset: F,
    index: usize,
    len: usize,
}

impl<F: Float> Linspace<F> {
    pub(crate) fn new(start: F, step: F, len: usize) -> Self {
        Linspace {
            start,
            step,
            offset: F::zero(),
            index: 0,
            len,
        }
    }
}

impl<F: Float> Iterator for Linspace<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            return None;
        }

        let x = self.start + self.step * self.offset;

        self.index += 1;
        self.offset = self.offset + F::one();

        Some(x)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl<F: Float> ExactSizeIterator for Linspace<F> {}

#[test]
fn test_linspace() {
    let samples: Vec<f64> = Linspace::new(1., 0.5, 5).collect();

    assert_eq!(samples, vec![1., 1.5, 2., 2.5, 3.]);
    assert_eq!(Linspace::new(0f32, 1., 0).count(), 0);
}
