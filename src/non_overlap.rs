use num_traits::Float;

use crate::{
    Direction, EdgeQuery, EdgeSense, MeasureError, MeasureResult, SampleSeries,
    level_search::first_matching,
};

/// Duration a switch-node signal spends beyond a guard band around one rail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardWindow<T> {
    /// Entered and left the band, lasting the given time
    Closed(T),
    /// Never entered the band
    NeverEntered,
    /// Entered the band but the record ends (or begins) inside it
    Unterminated,
}

impl<T: Float> GuardWindow<T> {
    /// Numeric form: the duration, `0` when never entered, `-1` when unterminated
    pub fn value(&self) -> T {
        match *self {
            GuardWindow::Closed(duration) => duration,
            GuardWindow::NeverEntered => T::zero(),
            GuardWindow::Unterminated => -T::one(),
        }
    }

    /// Returns the duration of a closed window
    pub fn duration(&self) -> Option<T> {
        match *self {
            GuardWindow::Closed(duration) => Some(duration),
            _ => None,
        }
    }
}

/// Non-overlap windows on both rails around a switching edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonOverlap<T> {
    /// Time spent below `vlow - vth`
    pub low_side: GuardWindow<T>,
    /// Time spent above `vhigh + vth`
    pub high_side: GuardWindow<T>,
}

impl<T: Float + Default> SampleSeries<T> {
    /// Measures the guard-band window reached from `from` in `direction`.
    ///
    /// The duration runs from the first sample inside the band to the first
    /// sample after it, both in time order, whichever way the band was found.
    fn guard_window<F>(&self, from: usize, direction: Direction, inside: F) -> GuardWindow<T>
    where
        F: Fn(T) -> bool,
    {
        let bound = match direction {
            Direction::Forward => self.last_index(),
            Direction::Backward => 0,
        };
        let Some(reached) = first_matching(&self.values, from, bound, direction, &inside) else {
            return GuardWindow::NeverEntered;
        };
        let outside = |v: T| !inside(v);
        let Some(left) = first_matching(&self.values, reached, bound, direction, outside) else {
            return GuardWindow::Unterminated;
        };

        let (entry, exit) = match direction {
            Direction::Forward => (reached, left),
            Direction::Backward => (left + 1, reached + 1),
        };
        if exit >= self.len() {
            return GuardWindow::Unterminated;
        }
        self.span(entry, exit, "non-overlap");
        GuardWindow::Closed(self.times[exit] - self.times[entry])
    }

    fn non_overlap(
        &self,
        vth: T,
        vhigh: T,
        vlow: T,
        sense: EdgeSense,
    ) -> MeasureResult<NonOverlap<T>> {
        if vth < T::zero() || vth.is_nan() {
            return Err(MeasureError::InvalidParameter {
                name: "vth",
                reason: "must be non-negative",
            });
        }

        let Some(edge) = self.find_edge(&EdgeQuery::between(vlow, vhigh), sense)? else {
            log::warn!("non-overlap unavailable: no {sense:?} 50% edge");
            return Ok(NonOverlap {
                low_side: GuardWindow::Unterminated,
                high_side: GuardWindow::Unterminated,
            });
        };

        let low_guard = vlow - vth;
        let high_guard = vhigh + vth;
        let below = |v: T| v < low_guard;
        let above = |v: T| v > high_guard;

        let low_direction = match sense {
            EdgeSense::Rising => Direction::Backward,
            EdgeSense::Falling => Direction::Forward,
        };
        let result = NonOverlap {
            low_side: self.guard_window(edge.index, low_direction, below),
            high_side: self.guard_window(edge.index, low_direction.reverse(), above),
        };

        if result.low_side == GuardWindow::Unterminated {
            log::warn!("{sense:?} non-overlap: low-side window never terminates");
        }
        if result.high_side == GuardWindow::Unterminated {
            log::warn!("{sense:?} non-overlap: high-side window never terminates");
        }
        Ok(result)
    }

    /// Non-overlap windows around the first rising 50% edge between `vlow`
    /// and `vhigh`
    ///
    /// The low-side window (below `vlow - vth`) is searched backward from the
    /// edge and the high-side window (above `vhigh + vth`) forward.
    ///
    /// # Arguments
    ///
    /// * `vth` - Guard band, must be non-negative
    /// * `vhigh` - High rail
    /// * `vlow` - Low rail
    ///
    /// # Returns
    ///
    /// * `MeasureResult<NonOverlap<T>>` - Both windows; both `Unterminated`
    ///   with a warning when there is no 50% edge; an error for a negative
    ///   `vth` or `vlow >= vhigh`
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::{GuardWindow, SampleSeries};
    ///
    /// let times = (0..12).map(|i| i as f64).collect();
    /// let values = vec![0.0, 0.0, -0.8, -0.8, 0.0, 6.0, 12.0, 12.0, 12.0, 10.0, 10.0, 10.0];
    /// let series = SampleSeries::new(times, values).unwrap();
    ///
    /// let nol = series.sw_nol_rise(1.0, 10.0, 0.0).unwrap();
    /// assert_eq!(nol.low_side, GuardWindow::NeverEntered);
    /// assert_eq!(nol.high_side, GuardWindow::Closed(3.0));
    /// assert!(series.sw_nol_rise(-1.0, 10.0, 0.0).is_err());
    /// ```
    pub fn sw_nol_rise(&self, vth: T, vhigh: T, vlow: T) -> MeasureResult<NonOverlap<T>> {
        self.non_overlap(vth, vhigh, vlow, EdgeSense::Rising)
    }

    /// Non-overlap windows around the first falling 50% edge between `vlow`
    /// and `vhigh`; the high side is searched backward and the low side forward
    pub fn sw_nol_fall(&self, vth: T, vhigh: T, vlow: T) -> MeasureResult<NonOverlap<T>> {
        self.non_overlap(vth, vhigh, vlow, EdgeSense::Falling)
    }
}
