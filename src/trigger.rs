use num_traits::Float;

use crate::{
    Direction, MeasureError, MeasureResult, SampleSeries,
    annotation::{AnnotationClass, AnnotationKind},
    helper::cast,
    level_search::first_matching,
};

/// Fraction of the baseline swing that declares a 10/90 trigger
pub(crate) const LOW_PCT: f64 = 0.1;
/// Fraction of the baseline swing that ends a 10/90 window
pub(crate) const HIGH_PCT: f64 = 0.9;

/// Direction of a detected deviation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Deviation above the baseline
    Rising,
    /// Deviation below the baseline
    Falling,
    /// No deviation found
    None,
}

impl Polarity {
    /// Returns `true` for [`Polarity::None`]
    pub const fn is_none(self) -> bool {
        matches!(self, Polarity::None)
    }
}

/// Outcome of a trigger search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerState<T> {
    /// Direction of the deviation
    pub polarity: Polarity,
    /// Index of the triggering sample
    pub index: Option<usize>,
    /// Value of the triggering sample, zero when none was found
    pub value: T,
    /// Time of the triggering sample
    pub time: Option<T>,
}

impl<T: Float> TriggerState<T> {
    /// A search that found nothing
    pub fn not_found() -> Self {
        Self {
            polarity: Polarity::None,
            index: None,
            value: T::zero(),
            time: None,
        }
    }

    /// Returns `true` when the search located a triggering sample
    pub fn is_found(&self) -> bool {
        !self.polarity.is_none() && self.index.is_some()
    }
}

impl<T: Float + Default> SampleSeries<T> {
    fn trigger_at(&self, polarity: Polarity, index: usize) -> TriggerState<T> {
        TriggerState {
            polarity,
            index: Some(index),
            value: self.values[index],
            time: Some(self.times[index]),
        }
    }

    /// Searches for the first sample deviating from the leading baseline
    /// without touching the cache
    ///
    /// The deviation is `sigma * stdev_in` or an absolute level, per
    /// [`SeriesConfig::trigger_level`](crate::SeriesConfig::trigger_level).
    /// A sample strictly above `average_in + deviation` triggers rising, one
    /// strictly below `average_in - deviation` triggers falling; the lowest
    /// index wins. Finding nothing is not an error.
    pub fn detect_trigger(&self) -> MeasureResult<TriggerState<T>> {
        let baseline = self.baseline()?;
        let offset = self.config.trigger_level().offset(baseline.stdev_in);
        let upper = baseline.average_in + offset;
        let lower = baseline.average_in - offset;

        let state = first_matching(
            &self.values,
            0,
            self.last_index(),
            Direction::Forward,
            |v| v > upper || v < lower,
        )
        .map_or_else(TriggerState::not_found, |index| {
            let polarity = if self.values[index] > upper {
                Polarity::Rising
            } else {
                Polarity::Falling
            };
            self.trigger_at(polarity, index)
        });

        log::debug!("trigger: {:?} at {:?}", state.polarity, state.index);
        if let Some(index) = state.index {
            self.record(
                AnnotationKind::Level { value: upper },
                "trigger upper",
                AnnotationClass::Threshold,
            );
            self.record(
                AnnotationKind::Level { value: lower },
                "trigger lower",
                AnnotationClass::Threshold,
            );
            self.mark(index, "trigger", AnnotationClass::Trigger);
        }
        Ok(state)
    }

    /// Runs the sigma/absolute trigger search and caches the result
    ///
    /// # Returns
    ///
    /// * `MeasureResult<TriggerState<T>>` - The trigger, or `BaselineUndefined`
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::{Polarity, SampleSeries};
    ///
    /// let times = (0..20).map(|i| i as f64).collect();
    /// let mut values = vec![0.0; 20];
    /// values[12] = -4.0;
    /// let mut series = SampleSeries::new(times, values).unwrap();
    ///
    /// let trigger = series.trigger().unwrap();
    /// assert_eq!(trigger.polarity, Polarity::Falling);
    /// assert_eq!(trigger.index, Some(12));
    /// assert_eq!(series.cached_trigger(), Some(&trigger));
    /// ```
    pub fn trigger(&mut self) -> MeasureResult<TriggerState<T>> {
        let state = self.detect_trigger()?;
        self.trigger = Some(state);
        Ok(state)
    }

    /// Searches for the 10/90 trigger without touching the cache
    ///
    /// Polarity follows the sign of `average_out - average_in`; the trigger is
    /// the first sample at or past 10% of that swing, measured from
    /// `average_in`. Equal baselines give [`Polarity::None`].
    pub fn detect_trigger_10_90(&self) -> MeasureResult<TriggerState<T>> {
        let baseline = self.baseline()?;
        let swing = baseline.average_out - baseline.average_in;
        let polarity = if swing > T::zero() {
            Polarity::Rising
        } else if swing < T::zero() {
            Polarity::Falling
        } else {
            Polarity::None
        };

        let threshold = baseline.average_in + cast::<T>(LOW_PCT)? * swing;
        let last = self.last_index();
        let index = match polarity {
            Polarity::Rising => self.first_at_or_above(threshold, 0, last, Direction::Forward),
            Polarity::Falling => self.first_at_or_below(threshold, 0, last, Direction::Forward),
            Polarity::None => None,
        };

        let state = match index {
            Some(index) => self.trigger_at(polarity, index),
            None => TriggerState {
                polarity,
                ..TriggerState::not_found()
            },
        };

        log::debug!("10/90 trigger: {:?} at {:?}", state.polarity, state.index);
        if let Some(index) = state.index {
            self.record(
                AnnotationKind::Level { value: threshold },
                "10% level",
                AnnotationClass::Threshold,
            );
            self.mark(index, "10/90 trigger", AnnotationClass::Trigger);
        }
        Ok(state)
    }

    /// Runs the 10/90 trigger search and caches the result
    pub fn trigger_10_90(&mut self) -> MeasureResult<TriggerState<T>> {
        let state = self.detect_trigger_10_90()?;
        self.trigger_10_90 = Some(state);
        Ok(state)
    }

    /// Explicit trigger first, then the cache, then a fresh search
    pub(crate) fn resolve_trigger(
        &self,
        given: Option<TriggerState<T>>,
    ) -> MeasureResult<TriggerState<T>> {
        match given.or(self.trigger) {
            Some(state) => Ok(state),
            None => self.detect_trigger(),
        }
    }

    pub(crate) fn resolve_trigger_10_90(
        &self,
        given: Option<TriggerState<T>>,
    ) -> MeasureResult<TriggerState<T>> {
        match given.or(self.trigger_10_90) {
            Some(state) => Ok(state),
            None => self.detect_trigger_10_90(),
        }
    }

    /// Like [`resolve_trigger`](Self::resolve_trigger) but a missing trigger is fatal
    pub(crate) fn require_trigger(
        &self,
        given: Option<TriggerState<T>>,
    ) -> MeasureResult<(usize, T)> {
        let state = self.resolve_trigger(given)?;
        match (state.index, state.time) {
            (Some(index), Some(time)) if state.is_found() => Ok((index, time)),
            _ => Err(MeasureError::NoTriggerFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::*;
    use crate::{SeriesConfig, TriggerLevel};

    fn series(
        values: Vec<f64>,
        leader_fraction: f64,
        level: TriggerLevel<f64>,
    ) -> SampleSeries<f64> {
        let times = (0..values.len()).map(|i| i as f64 * 0.5).collect();
        let mut config = SeriesConfig::new();
        config
            .set_leader_fraction(leader_fraction)
            .set_trigger_level(level);
        SampleSeries::with_config(times, values, config).unwrap()
    }

    #[test]
    fn flat_series_never_triggers() {
        let mut s = series(vec![2.0; 40], 0.1, TriggerLevel::Sigma(3.0));
        let state = s.trigger().unwrap();
        assert_eq!(state.polarity, Polarity::None);
        assert_eq!(state.index, None);
        assert_eq!(state.value, 0.0);
        assert_eq!(state.time, None);
        assert!(!state.is_found());
    }

    #[test]
    fn sigma_trigger_rising() {
        let mut values = vec![1.0, 1.2, 0.8, 1.0, 1.2, 0.8, 1.0, 1.0, 1.1, 0.9];
        values.extend([1.3, 1.9, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0]);
        let mut s = series(values, 0.3, TriggerLevel::Sigma(3.0));
        // stdev of the leader window is sqrt(0.08 / 3)
        let state = s.trigger().unwrap();
        assert_eq!(state.polarity, Polarity::Rising);
        assert_eq!(state.index, Some(11));
        assert_eq!(state.value, 1.9);
        assert_eq!(state.time, Some(5.5));
        assert!(state.is_found());
    }

    #[test]
    fn absolute_trigger_falling() {
        let values = vec![0.0, 0.0, 0.0, 0.0, -0.2, -0.6, -1.0, -1.0, -1.0, -1.0];
        let s = series(values, 0.2, TriggerLevel::Absolute(0.5));
        let state = s.detect_trigger().unwrap();
        assert_eq!(state.polarity, Polarity::Falling);
        assert_eq!(state.index, Some(5));
        assert_eq!(s.cached_trigger(), None);
    }

    #[test]
    fn first_deviation_wins() {
        let values = vec![0.0, 0.0, 0.0, 0.0, -2.0, 2.0, 0.0, 0.0, 0.0, 0.0];
        let s = series(values, 0.2, TriggerLevel::Absolute(1.0));
        assert_eq!(s.detect_trigger().unwrap().polarity, Polarity::Falling);
    }

    #[test]
    fn trigger_10_90_polarity_and_index() {
        let values = vec![0.0, 0.0, 0.5, 1.0, 2.0, 5.0, 9.0, 10.0, 10.0, 10.0];
        let mut s = series(values, 0.2, TriggerLevel::Sigma(3.0));
        let state = s.trigger_10_90().unwrap();
        assert_eq!(state.polarity, Polarity::Rising);
        assert_eq!(state.index, Some(3));
        assert_eq!(s.cached_trigger_10_90(), Some(&state));

        let values = vec![4.0, 4.0, 4.0, 3.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let state = series(values, 0.2, TriggerLevel::Sigma(3.0))
            .detect_trigger_10_90()
            .unwrap();
        assert_eq!(state.polarity, Polarity::Falling);
        assert_eq!(state.index, Some(3));
    }

    #[test]
    fn trigger_10_90_equal_baselines() {
        let values = vec![1.0, 1.0, 3.0, 5.0, 3.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let state = series(values, 0.2, TriggerLevel::Sigma(3.0))
            .detect_trigger_10_90()
            .unwrap();
        assert_eq!(state, TriggerState::not_found());
    }

    #[test]
    fn cache_is_overwritten_and_cleared() {
        let values = vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0, 1.0];
        let mut s = series(values, 0.2, TriggerLevel::Absolute(0.5));
        assert_eq!(s.trigger().unwrap().index, Some(5));

        s.config.set_trigger_level(TriggerLevel::Absolute(0.1));
        assert_eq!(s.trigger().unwrap().index, Some(4));
        assert_eq!(s.cached_trigger().and_then(|t| t.index), Some(4));

        s.trigger_10_90().unwrap();
        s.clear_cache();
        assert_eq!(s.cached_trigger(), None);
        assert_eq!(s.cached_trigger_10_90(), None);
    }

    #[test]
    fn require_trigger_maps_absence_to_error() {
        let s = series(vec![2.0; 20], 0.1, TriggerLevel::Sigma(3.0));
        assert_eq!(
            s.require_trigger(None).unwrap_err(),
            MeasureError::NoTriggerFound
        );

        let values = vec![0.0, 0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0, 1.0];
        let s = series(values, 0.2, TriggerLevel::Absolute(0.5));
        assert_eq!(s.require_trigger(None).unwrap(), (5, 2.5));
        let missing = TriggerState::not_found();
        assert_eq!(
            s.require_trigger(Some(missing)).unwrap_err(),
            MeasureError::NoTriggerFound
        );
    }

    #[test]
    fn baseline_required() {
        let times = (0..6).map(|i| i as f64).collect();
        let values = vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let s = SampleSeries::new(times, values).unwrap();
        assert_eq!(
            s.detect_trigger().unwrap_err(),
            MeasureError::BaselineUndefined { len: 6 }
        );
    }
}
