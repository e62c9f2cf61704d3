use num_traits::Float;

use crate::Kbn;

/// Accumulated first and second moments of `(x, y)` pairs
///
/// Pairs are shifted by the first pair pushed before they are summed, so a
/// window sitting far from the origin (a capture that starts at `t = 1 s`
/// with nanosecond spacing) keeps its precision in the covariance terms.
#[derive(Debug, Clone)]
pub struct PairedMoments<T> {
    /// Number of pairs pushed
    len: usize,
    /// First pair, used as the shift
    origin: Option<(T, T)>,
    /// Sum of shifted inputs
    sum: (Kbn<T>, Kbn<T>),
    /// Sum of squares of shifted x
    sum_sq_x: Kbn<T>,
    /// Sum of products of shifted x and y
    sum_prod: Kbn<T>,
}

impl<T: Float + Default> PairedMoments<T> {
    /// Creates an empty accumulator
    pub fn new() -> Self {
        Self {
            len: 0,
            origin: None,
            sum: Default::default(),
            sum_sq_x: Kbn::default(),
            sum_prod: Kbn::default(),
        }
    }

    /// Number of pairs pushed so far
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Adds a pair to the moments
    ///
    /// # Arguments
    ///
    /// * `(x, y)` - The pair to add
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The accumulator for chaining
    pub fn next(&mut self, (x, y): (T, T)) -> &mut Self {
        let (x0, y0) = *self.origin.get_or_insert((x, y));
        let dx = x - x0;
        let dy = y - y0;

        self.sum.0 += dx;
        self.sum.1 += dy;
        self.sum_sq_x += dx * dx;
        self.sum_prod += dx * dy;
        self.len += 1;
        self
    }

    fn mean(&self) -> Option<(T, T)> {
        let n = T::from(self.len)?;
        (self.len > 0).then(|| (self.sum.0.total() / n, self.sum.1.total() / n))
    }

    /// Population covariance of x and y
    pub fn cov(&self) -> Option<T> {
        let (mean_x, mean_y) = self.mean()?;
        let n = T::from(self.len)?;
        Some(self.sum_prod.total() / n - mean_x * mean_y)
    }

    /// Population variance of x
    pub fn variance_x(&self) -> Option<T> {
        let (mean_x, _) = self.mean()?;
        let n = T::from(self.len)?;
        Some((self.sum_sq_x.total() / n - mean_x * mean_x).max(T::zero()))
    }

    /// Ordinary least squares slope of y against x
    ///
    /// # Returns
    ///
    /// * `Option<T>` - `cov(x, y) / var(x)`, or `None` with fewer than two pairs
    ///   or when every x is equal
    pub fn beta(&self) -> Option<T> {
        if self.len < 2 {
            return None;
        }
        self.cov().zip(self.variance_x()).and_then(
            |(cov, var)| {
                if var.is_zero() { None } else { Some(cov / var) }
            },
        )
    }
}

impl<T: Float + Default> Default for PairedMoments<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn beta_of_exact_line() {
        let mut moments = PairedMoments::new();
        for i in 0..10 {
            let x = i as f64 * 0.5;
            moments.next((x, 3.0 * x - 1.0));
        }
        assert_eq!(moments.len(), 10);
        assert_approx_eq!(moments.beta().unwrap(), 3.0);
    }

    #[test]
    fn beta_survives_large_offset() {
        let mut moments = PairedMoments::new();
        for i in 0..100 {
            let t = 1.0 + i as f64 * 1e-9;
            moments.next((t, 2e6 * (t - 1.0)));
        }
        assert_approx_eq!(moments.beta().unwrap(), 2e6, 1.0);
    }

    #[test]
    fn cov_and_variance_work() {
        let mut moments = PairedMoments::new();
        [(2.0, 1.0), (4.0, 3.0), (6.0, 2.0)].iter().for_each(|p| {
            moments.next(*p);
        });
        assert_approx_eq!(moments.cov().unwrap(), 0.6667, 1e-3);
        assert_approx_eq!(moments.variance_x().unwrap(), 2.6667, 1e-3);
        assert_approx_eq!(moments.beta().unwrap(), 0.25, 1e-3);
    }

    #[test]
    fn beta_degenerate() {
        let mut moments = PairedMoments::new();
        assert_eq!(moments.beta(), None);
        moments.next((1.0, 2.0));
        assert_eq!(moments.beta(), None);
        moments.next((1.0, 5.0));
        assert_eq!(moments.beta(), None);
    }
}
