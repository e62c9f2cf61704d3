//! Directional threshold-crossing primitives.
//!
//! Every search scans an inclusive index range `[start, stop]` one sample at a
//! time and returns the exact index of the first matching sample. Nothing is
//! interpolated, so every timing derived from these indices is snapped to whole
//! samples.

use num_traits::Float;

/// Scan direction of a level search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Increasing sample index (increment `+1`)
    Forward,
    /// Decreasing sample index (increment `-1`)
    Backward,
}

impl Direction {
    /// Returns the opposite direction
    pub const fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Returns the first index in `[start, stop]`, scanned in `direction`, whose
/// value satisfies `pred`
///
/// The range is empty when it runs against the direction (`start > stop`
/// forward, `start < stop` backward) or when `start` lies past the end of
/// `values`. A `stop` past the end is clamped to the last sample.
///
/// # Arguments
///
/// * `values` - The samples to scan
/// * `start` - First index visited
/// * `stop` - Last index visited
/// * `direction` - Scan direction
/// * `pred` - Match condition
///
/// # Returns
///
/// * `Option<usize>` - The matching index, or `None` if the range is exhausted
pub fn first_matching<T, F>(
    values: &[T],
    start: usize,
    stop: usize,
    direction: Direction,
    mut pred: F,
) -> Option<usize>
where
    T: Copy,
    F: FnMut(T) -> bool,
{
    let last = values.len().checked_sub(1)?;
    if start > last {
        return None;
    }
    let stop = stop.min(last);

    match direction {
        Direction::Forward if start <= stop => (start..=stop).find(|&i| pred(values[i])),
        Direction::Backward if start >= stop => (stop..=start).rev().find(|&i| pred(values[i])),
        _ => None,
    }
}

/// Returns the first index whose value is at or above `threshold`
///
/// # Examples
///
/// ```
/// use waveform_measure::{Direction, first_at_or_above};
///
/// let values = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0];
/// assert_eq!(first_at_or_above(&values, 2.0, 0, 5, Direction::Forward), Some(2));
/// assert_eq!(first_at_or_above(&values, 2.0, 5, 0, Direction::Backward), Some(4));
/// assert_eq!(first_at_or_above(&values, 4.0, 0, 5, Direction::Forward), None);
/// ```
#[inline]
pub fn first_at_or_above<T: Float>(
    values: &[T],
    threshold: T,
    start: usize,
    stop: usize,
    direction: Direction,
) -> Option<usize> {
    first_matching(values, start, stop, direction, |v| v >= threshold)
}

/// Returns the first index whose value is at or below `threshold`
///
/// # Examples
///
/// ```
/// use waveform_measure::{Direction, first_at_or_below};
///
/// let values = [3.0, 2.0, 1.0, 0.0, 1.0];
/// assert_eq!(first_at_or_below(&values, 1.0, 0, 4, Direction::Forward), Some(2));
/// assert_eq!(first_at_or_below(&values, 1.0, 4, 0, Direction::Backward), Some(4));
/// ```
#[inline]
pub fn first_at_or_below<T: Float>(
    values: &[T],
    threshold: T,
    start: usize,
    stop: usize,
    direction: Direction,
) -> Option<usize> {
    first_matching(values, start, stop, direction, |v| v <= threshold)
}
