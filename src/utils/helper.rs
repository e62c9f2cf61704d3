use num_traits::Float;
use ordered_float::{OrderedFloat, PrimitiveFloat};

use crate::{Kbn, MeasureError, MeasureResult};

/// Converts an `f64` constant into the sample type
///
/// # Arguments
///
/// * `x` - The constant to convert
///
/// # Returns
///
/// * `MeasureResult<T>` - The converted value, or `NumericCast` if it is not representable
#[inline]
pub fn cast<T: Float>(x: f64) -> MeasureResult<T> {
    T::from(x).ok_or(MeasureError::NumericCast)
}

/// Returns the mean and population standard deviation of a slice
///
/// Both passes use compensated summation; the second pass sums squared
/// deviations from the mean rather than raw squares.
///
/// # Arguments
///
/// * `xs` - The samples
///
/// # Returns
///
/// * `Option<(T, T)>` - `(mean, stddev)`, or `None` if the slice is empty
pub fn mean_stddev<T: Float + Default>(xs: &[T]) -> Option<(T, T)> {
    if xs.is_empty() {
        return None;
    }
    let n = T::from(xs.len())?;

    let mut sum = Kbn::default();
    xs.iter().for_each(|&x| sum += x);
    let mean = sum.total() / n;

    let mut sum_sq = Kbn::default();
    xs.iter().for_each(|&x| sum_sq += (x - mean) * (x - mean));
    let variance = sum_sq.total() / n;

    Some((mean, variance.max(T::zero()).sqrt()))
}

/// Index of the first occurrence of the largest value
#[inline]
pub fn argmax<T: Float + PrimitiveFloat>(xs: &[T]) -> Option<usize> {
    // max_by_key keeps the last maximum, so walk backwards to get the first
    xs.iter()
        .enumerate()
        .rev()
        .max_by_key(|&(_, &x)| OrderedFloat(x))
        .map(|(i, _)| i)
}

/// Index of the first occurrence of the smallest value
#[inline]
pub fn argmin<T: Float + PrimitiveFloat>(xs: &[T]) -> Option<usize> {
    xs.iter()
        .enumerate()
        .min_by_key(|&(_, &x)| OrderedFloat(x))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn mean_stddev_works() {
        let (mean, stddev) = mean_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_approx_eq!(mean, 5.0);
        assert_approx_eq!(stddev, 2.0);
    }

    #[test]
    fn mean_stddev_of_large_offset() {
        let xs = [1_000_000.1, 1_000_000.3, 1_000_000.1, 1_000_000.3];
        let (mean, stddev) = mean_stddev(&xs).unwrap();
        assert_approx_eq!(mean, 1_000_000.2, 1e-6);
        assert_approx_eq!(stddev, 0.1, 1e-6);
    }

    #[test]
    fn mean_stddev_empty() {
        assert_eq!(mean_stddev::<f64>(&[]), None);
    }

    #[test]
    fn extrema_pick_first_occurrence() {
        let xs = [1.0, 3.0, -2.0, 3.0, -2.0];
        assert_eq!(argmax(&xs), Some(1));
        assert_eq!(argmin(&xs), Some(2));
        assert_eq!(argmax::<f64>(&[]), None);
    }
}
