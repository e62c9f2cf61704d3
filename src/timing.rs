use core::str::FromStr;

use num_traits::Float;
use ordered_float::PrimitiveFloat;

use crate::{
    Direction, MeasureError, MeasureResult, PairedMoments, Polarity, SampleSeries, TriggerState,
    annotation::{AnnotationClass, AnnotationKind},
    helper::{argmax, argmin, cast},
    level_search::first_matching,
    trigger::HIGH_PCT,
};

/// Which extreme of the record anchors a max-deviation settling time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deviation {
    /// Global maximum (`"pos"`)
    Positive,
    /// Global minimum (`"neg"`)
    Negative,
}

impl FromStr for Deviation {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pos" => Ok(Deviation::Positive),
            "neg" => Ok(Deviation::Negative),
            _ => Err(MeasureError::InvalidParameter {
                name: "deviation",
                reason: "expected \"pos\" or \"neg\"",
            }),
        }
    }
}

impl<T: Float + Default> SampleSeries<T> {
    /// Rise time between `low_pct` and `high_pct` of the baseline swing,
    /// searched from the first sample
    ///
    /// The thresholds are `average_in + pct * (average_out - average_in)` and
    /// the first sample at or above each one is used.
    ///
    /// # Arguments
    ///
    /// * `low_pct` - Lower fraction of the swing, typically `0.1`
    /// * `high_pct` - Upper fraction of the swing, typically `0.9`
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<T>>` - `time[high] - time[low]`, `None` with a
    ///   warning when the record does not rise or a level is never reached
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::{SampleSeries, SeriesConfig};
    ///
    /// let times = (0..10).map(|i| i as f64).collect();
    /// let values = vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0];
    /// let mut config = SeriesConfig::new();
    /// config.set_leader_fraction(0.2);
    /// let series = SampleSeries::with_config(times, values, config).unwrap();
    ///
    /// assert_eq!(series.rise_time(0.1, 0.9).unwrap(), Some(4.0));
    /// ```
    pub fn rise_time(&self, low_pct: T, high_pct: T) -> MeasureResult<Option<T>> {
        self.rise_time_from(0, low_pct, high_pct)
    }

    /// Fall time between `low_pct` and `high_pct` of the baseline swing,
    /// searched from the first sample
    pub fn fall_time(&self, low_pct: T, high_pct: T) -> MeasureResult<Option<T>> {
        self.fall_time_from(0, low_pct, high_pct)
    }

    /// [`rise_time`](Self::rise_time) searched from `start_index`, typically
    /// the index of a previously located edge or trigger
    pub fn rise_time_from(
        &self,
        start_index: usize,
        low_pct: T,
        high_pct: T,
    ) -> MeasureResult<Option<T>> {
        self.transition_time(start_index, low_pct, high_pct, Polarity::Rising)
    }

    /// [`fall_time`](Self::fall_time) searched from `start_index`
    pub fn fall_time_from(
        &self,
        start_index: usize,
        low_pct: T,
        high_pct: T,
    ) -> MeasureResult<Option<T>> {
        self.transition_time(start_index, low_pct, high_pct, Polarity::Falling)
    }

    fn transition_time(
        &self,
        start_index: usize,
        low_pct: T,
        high_pct: T,
        polarity: Polarity,
    ) -> MeasureResult<Option<T>> {
        if start_index >= self.len() {
            return Err(MeasureError::OutOfRange {
                index: start_index,
                len: self.len(),
            });
        }
        let baseline = self.baseline()?;
        let amplitude = match polarity {
            Polarity::Falling => baseline.average_in - baseline.average_out,
            _ => baseline.average_out - baseline.average_in,
        };
        if amplitude <= T::zero() {
            log::warn!("{polarity:?} time unavailable: baselines show no swing");
            return Ok(None);
        }

        let last = self.last_index();
        let crossing = |pct: T| match polarity {
            Polarity::Falling => self.first_at_or_below(
                baseline.average_in - pct * amplitude,
                start_index,
                last,
                Direction::Forward,
            ),
            _ => self.first_at_or_above(
                baseline.average_in + pct * amplitude,
                start_index,
                last,
                Direction::Forward,
            ),
        };

        match crossing(low_pct).zip(crossing(high_pct)) {
            Some((low, high)) => {
                self.span(low.min(high), low.max(high), "transition time");
                Ok(Some(self.times[high] - self.times[low]))
            }
            None => {
                log::warn!("{polarity:?} transition time: level not reached");
                Ok(None)
            }
        }
    }

    /// Slope of the 10%-90% transition, fitted by ordinary least squares
    ///
    /// The window starts at the 10/90 trigger and ends at the first sample at
    /// or past 90% of the baseline swing.
    ///
    /// # Arguments
    ///
    /// * `trigger` - A previously computed 10/90 trigger; the cached one, or a
    ///   fresh search, is used when `None`
    ///
    /// # Returns
    ///
    /// * `MeasureResult<T>` - The slope in value units per time unit;
    ///   `NoTrigger1090` without a polarity, `CrossingNotFound` when the 90%
    ///   level is never reached and `DegenerateRegression` for a window that can
    ///   not be fitted
    pub fn slew_rate(&self, trigger: Option<TriggerState<T>>) -> MeasureResult<T> {
        let state = self.resolve_trigger_10_90(trigger)?;
        let start = match (state.polarity, state.index) {
            (Polarity::Rising | Polarity::Falling, Some(index)) => index,
            _ => return Err(MeasureError::NoTrigger1090),
        };

        let baseline = self.baseline()?;
        let swing = baseline.average_out - baseline.average_in;
        let threshold = baseline.average_in + cast::<T>(HIGH_PCT)? * swing;
        let last = self.last_index();
        let stop = match state.polarity {
            Polarity::Falling => self.first_at_or_below(threshold, start, last, Direction::Forward),
            _ => self.first_at_or_above(threshold, start, last, Direction::Forward),
        }
        .ok_or(MeasureError::CrossingNotFound)?;

        let mut moments = PairedMoments::new();
        (start..=stop).for_each(|i| {
            moments.next((self.times[i], self.values[i]));
        });
        let slope = moments
            .beta()
            .ok_or(MeasureError::DegenerateRegression { len: moments.len() })?;

        log::debug!("slew rate over [{start}, {stop}]");
        self.span(start, stop, "slew window");
        Ok(slope)
    }

    /// Settling time from the sigma trigger to the last sample outside
    /// `[low_limit, high_limit]`
    ///
    /// # Arguments
    ///
    /// * `low_limit` - Lower edge of the settling band
    /// * `high_limit` - Upper edge of the settling band
    /// * `trigger` - A previously computed sigma trigger; the cached one, or a
    ///   fresh search, is used when `None`
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<T>>` - The settling time; `None` with a warning
    ///   when the last sample is still outside the band or the record never
    ///   leaves it; `NoTriggerFound` without a trigger and `InvalidParameter`
    ///   when `low_limit` exceeds `high_limit`
    pub fn settling_time(
        &self,
        low_limit: T,
        high_limit: T,
        trigger: Option<TriggerState<T>>,
    ) -> MeasureResult<Option<T>> {
        if low_limit > high_limit {
            return Err(MeasureError::InvalidParameter {
                name: "low_limit",
                reason: "must not exceed high_limit",
            });
        }
        let (_, trigger_time) = self.require_trigger(trigger)?;

        self.record(
            AnnotationKind::Level { value: low_limit },
            "settling low",
            AnnotationClass::Threshold,
        );
        self.record(
            AnnotationKind::Level { value: high_limit },
            "settling high",
            AnnotationClass::Threshold,
        );

        let last_outside = self.last_outside(|v| v < low_limit || v > high_limit, "settling band");
        Ok(last_outside.map(|i| {
            self.mark(i, "settled", AnnotationClass::Edge);
            self.times[i] - trigger_time
        }))
    }

    /// Settling time from the first sample outside `average_in ± |limit|` to
    /// the last one
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<T>>` - The settling time; `None` with a warning
    ///   when the record never leaves the band, starts outside it or ends
    ///   outside it
    pub fn settling_time_outside_limit(&self, limit: T) -> MeasureResult<Option<T>> {
        let average_in = self.average_in()?;
        let limit = limit.abs();
        let outside = |v: T| (v - average_in).abs() > limit;

        let last = self.last_index();
        let first = match first_matching(&self.values, 0, last, Direction::Forward, outside) {
            Some(0) => {
                log::warn!("settling time unavailable: starts outside the limit band");
                return Ok(None);
            }
            Some(first) => first,
            None => {
                log::warn!("settling time unavailable: never leaves the limit band");
                return Ok(None);
            }
        };

        Ok(self.last_outside(outside, "limit band").map(|last| {
            self.span(first, last, "outside limit");
            self.times[last] - self.times[first]
        }))
    }

    /// Time from `reference` to the last sample deviating from `center` by
    /// more than `|limit|`
    fn settling_from(&self, reference: usize, limit: T, center: T) -> MeasureResult<Option<T>> {
        let limit = limit.abs();
        Ok(self
            .last_outside(|v| (v - center).abs() > limit, "deviation band")
            .map(|last| {
                self.span(reference.min(last), reference.max(last), "settling");
                self.times[last] - self.times[reference]
            }))
    }

    /// Backward search for the last sample matching `outside`, with the
    /// warnings shared by the settling measurements
    fn last_outside<F>(&self, outside: F, band: &'static str) -> Option<usize>
    where
        F: FnMut(T) -> bool,
    {
        let last = self.last_index();
        match first_matching(&self.values, last, 0, Direction::Backward, outside) {
            Some(i) if i == last => {
                log::warn!("settling time unavailable: ends outside the {band}");
                None
            }
            Some(i) => Some(i),
            None => {
                log::warn!("settling time unavailable: never leaves the {band}");
                None
            }
        }
    }
}

impl<T: Float + Default + PrimitiveFloat> SampleSeries<T> {
    /// Largest excursion above the leading baseline, `max(values) - average_in`
    pub fn overshoot(&self) -> MeasureResult<T> {
        let average_in = self.average_in()?;
        let peak = argmax(&self.values).ok_or(MeasureError::CrossingNotFound)?;
        self.mark(peak, "overshoot", AnnotationClass::Edge);
        Ok(self.values[peak] - average_in)
    }

    /// Largest excursion below the leading baseline, `min(values) - average_in`
    pub fn undershoot(&self) -> MeasureResult<T> {
        let average_in = self.average_in()?;
        let trough = argmin(&self.values).ok_or(MeasureError::CrossingNotFound)?;
        self.mark(trough, "undershoot", AnnotationClass::Edge);
        Ok(self.values[trough] - average_in)
    }

    /// Settling time from the global extreme to the last sample deviating from
    /// `average_in` by more than `|limit|`
    ///
    /// # Arguments
    ///
    /// * `limit` - Allowed deviation from the leading baseline
    /// * `deviation` - Anchor on the global maximum or minimum; parse `"pos"` /
    ///   `"neg"` with [`str::parse`]
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Option<T>>` - The settling time; `None` with a warning
    ///   when the record ends outside the band or never leaves it
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::{Deviation, SampleSeries};
    ///
    /// let times = (0..12).map(|i| i as f64).collect();
    /// let values = vec![0.0, 0.0, 3.0, 2.0, -1.5, 0.8, -0.2, 0.1, 0.0, 0.0, 0.0, 0.0];
    /// let series = SampleSeries::new(times, values).unwrap();
    ///
    /// let deviation: Deviation = "pos".parse().unwrap();
    /// assert_eq!(series.settling_time_from_max_deviation(0.5, deviation).unwrap(), Some(3.0));
    /// assert!("up".parse::<Deviation>().is_err());
    /// ```
    pub fn settling_time_from_max_deviation(
        &self,
        limit: T,
        deviation: Deviation,
    ) -> MeasureResult<Option<T>> {
        let average_in = self.average_in()?;
        let reference = match deviation {
            Deviation::Positive => argmax(&self.values),
            Deviation::Negative => argmin(&self.values),
        }
        .ok_or(MeasureError::CrossingNotFound)?;
        self.mark(reference, "max deviation", AnnotationClass::Trigger);
        self.settling_from(reference, limit, average_in)
    }
}
