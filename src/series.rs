use alloc::vec::Vec;

use num_traits::Float;

use crate::{
    Direction, MeasureError, MeasureResult, SeriesConfig, TriggerState,
    annotation::{Annotation, AnnotationClass, AnnotationKind, Recorder},
    config::MIN_SAMPLES,
    helper::mean_stddev,
    level_search,
};

/// Leading and trailing baseline statistics of a capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline<T> {
    /// Mean of the leading window
    pub average_in: T,
    /// Mean of the trailing window
    pub average_out: T,
    /// Population standard deviation of the leading window
    pub stdev_in: T,
    /// Population standard deviation of the trailing window
    pub stdev_out: T,
}

/// A captured waveform: two aligned sequences of sample times and values.
///
/// The series owns its samples and is read-only for its lifetime. Baseline
/// statistics over the leading and trailing `floor(len * leader_fraction)`
/// samples are computed once at construction using Kahan-Babuska-Neumaier
/// summation.
///
/// Trigger searches can be cached on the instance: [`trigger`](Self::trigger)
/// and [`trigger_10_90`](Self::trigger_10_90) overwrite their slot on every
/// call and [`clear_cache`](Self::clear_cache) empties both. Measurements that
/// need a trigger take it as an explicit argument and fall back to the cached
/// slot, then to a fresh search, when it is `None`.
///
/// A series is meant to be driven by one caller at a time (compute, then read
/// the results). It records annotations through interior mutability and is
/// therefore not `Sync`.
#[derive(Debug, Clone)]
pub struct SampleSeries<T> {
    /// Sample times, assumed non-decreasing
    pub(crate) times: Vec<T>,
    /// Sample values
    pub(crate) values: Vec<T>,
    /// Series configuration
    pub(crate) config: SeriesConfig<T>,
    /// Number of samples in each baseline window
    index_size: usize,
    /// Baseline statistics, `None` when the windows are empty
    baseline: Option<Baseline<T>>,
    /// Externally supplied stationarity verdict
    stationary: Option<bool>,
    /// Cached sigma trigger
    pub(crate) trigger: Option<TriggerState<T>>,
    /// Cached 10/90 trigger
    pub(crate) trigger_10_90: Option<TriggerState<T>>,
    /// Annotation events
    pub(crate) recorder: Recorder<T>,
}

impl<T: Float + Default> SampleSeries<T> {
    /// Creates a series with the default configuration
    ///
    /// # Arguments
    ///
    /// * `times` - Sample times
    /// * `values` - Sample values, same length as `times`
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Self>` - The series, or a construction error
    ///
    /// # Examples
    ///
    /// ```
    /// use waveform_measure::SampleSeries;
    ///
    /// let times = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    /// let values = vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0];
    /// let series = SampleSeries::new(times, values).unwrap();
    ///
    /// assert_eq!(series.index_size(), 1);
    /// assert_eq!(series.average_in().unwrap(), 1.0);
    /// assert_eq!(series.average_out().unwrap(), 3.0);
    /// ```
    pub fn new(times: Vec<T>, values: Vec<T>) -> MeasureResult<Self> {
        Self::with_config(times, values, SeriesConfig::default())
    }

    /// Creates a series with an explicit configuration
    ///
    /// Fails with `LengthMismatch` when the sequences differ in length,
    /// `TooFewSamples` below four samples and `InvalidLeaderFraction` when the
    /// leader fraction is outside (0, 0.5). A leader window that rounds down to
    /// zero samples is accepted; baseline-dependent measurements on such a
    /// series fail with `BaselineUndefined`.
    pub fn with_config(
        times: Vec<T>,
        values: Vec<T>,
        config: SeriesConfig<T>,
    ) -> MeasureResult<Self> {
        if times.len() != values.len() {
            return Err(MeasureError::LengthMismatch {
                times: times.len(),
                values: values.len(),
            });
        }
        let len = values.len();
        if len < MIN_SAMPLES {
            return Err(MeasureError::TooFewSamples {
                len,
                min: MIN_SAMPLES,
            });
        }
        if !config.leader_fraction_is_valid() {
            return Err(MeasureError::InvalidLeaderFraction);
        }

        let index_size = (len as f64 * config.leader_fraction()).floor() as usize;
        let baseline = mean_stddev(&values[..index_size])
            .zip(mean_stddev(&values[len - index_size..]))
            .map(|((average_in, stdev_in), (average_out, stdev_out))| Baseline {
                average_in,
                average_out,
                stdev_in,
                stdev_out,
            });

        if baseline.is_none() {
            log::debug!("baseline undefined for {len} samples");
        }

        let series = Self {
            times,
            values,
            config,
            index_size,
            baseline,
            stationary: None,
            trigger: None,
            trigger_10_90: None,
            recorder: Recorder::new(config.annotate()),
        };

        if let Some(baseline) = series.baseline {
            series.record(
                AnnotationKind::Level {
                    value: baseline.average_in,
                },
                "average in",
                AnnotationClass::Baseline,
            );
            series.record(
                AnnotationKind::Level {
                    value: baseline.average_out,
                },
                "average out",
                AnnotationClass::Baseline,
            );
        }

        Ok(series)
    }

    /// Attaches the verdict of an external stationarity check
    ///
    /// A non-stationary verdict only emits a warning: the leading and trailing
    /// windows may not be representative baselines.
    ///
    /// # Arguments
    ///
    /// * `stationary` - Result of the external check
    ///
    /// # Returns
    ///
    /// * `Self` - The series
    pub fn with_stationarity(mut self, stationary: bool) -> Self {
        if !stationary {
            log::warn!("baseline windows are not stationary");
        }
        self.stationary = Some(stationary);
        self
    }

    /// Returns the external stationarity verdict, if one was attached
    pub const fn stationary(&self) -> Option<bool> {
        self.stationary
    }

    /// Returns the number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Index of the last sample
    #[inline]
    pub(crate) fn last_index(&self) -> usize {
        self.values.len() - 1
    }

    /// Returns the sample times
    pub fn times(&self) -> &[T] {
        &self.times
    }

    /// Returns the sample values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Returns the configuration the series was built with
    pub const fn config(&self) -> &SeriesConfig<T> {
        &self.config
    }

    /// Returns the number of samples in each baseline window
    pub const fn index_size(&self) -> usize {
        self.index_size
    }

    /// Returns the baseline statistics
    ///
    /// # Returns
    ///
    /// * `MeasureResult<Baseline<T>>` - The statistics, or `BaselineUndefined`
    ///   when the leader window holds no samples
    pub fn baseline(&self) -> MeasureResult<Baseline<T>> {
        self.baseline
            .ok_or(MeasureError::BaselineUndefined { len: self.len() })
    }

    /// Mean of the leading window
    pub fn average_in(&self) -> MeasureResult<T> {
        self.baseline().map(|b| b.average_in)
    }

    /// Mean of the trailing window
    pub fn average_out(&self) -> MeasureResult<T> {
        self.baseline().map(|b| b.average_out)
    }

    /// Population standard deviation of the leading window
    pub fn stdev_in(&self) -> MeasureResult<T> {
        self.baseline().map(|b| b.stdev_in)
    }

    /// Population standard deviation of the trailing window
    pub fn stdev_out(&self) -> MeasureResult<T> {
        self.baseline().map(|b| b.stdev_out)
    }

    /// First index in `[start, stop]` at or above `threshold`, see
    /// [`first_at_or_above`](crate::first_at_or_above)
    pub fn first_at_or_above(
        &self,
        threshold: T,
        start: usize,
        stop: usize,
        direction: Direction,
    ) -> Option<usize> {
        level_search::first_at_or_above(&self.values, threshold, start, stop, direction)
    }

    /// First index in `[start, stop]` at or below `threshold`, see
    /// [`first_at_or_below`](crate::first_at_or_below)
    pub fn first_at_or_below(
        &self,
        threshold: T,
        start: usize,
        stop: usize,
        direction: Direction,
    ) -> Option<usize> {
        level_search::first_at_or_below(&self.values, threshold, start, stop, direction)
    }

    /// Returns the cached sigma trigger, if any
    pub const fn cached_trigger(&self) -> Option<&TriggerState<T>> {
        self.trigger.as_ref()
    }

    /// Returns the cached 10/90 trigger, if any
    pub const fn cached_trigger_10_90(&self) -> Option<&TriggerState<T>> {
        self.trigger_10_90.as_ref()
    }

    /// Empties both trigger cache slots
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The series
    pub fn clear_cache(&mut self) -> &mut Self {
        self.trigger = None;
        self.trigger_10_90 = None;
        self
    }

    /// Returns a copy of the annotations recorded so far
    pub fn annotations(&self) -> Vec<Annotation<T>> {
        self.recorder.snapshot()
    }

    /// Drains the recorded annotations
    pub fn take_annotations(&mut self) -> Vec<Annotation<T>> {
        self.recorder.take()
    }

    #[inline]
    pub(crate) fn record(
        &self,
        kind: AnnotationKind<T>,
        label: &'static str,
        class: AnnotationClass,
    ) {
        self.recorder.record(kind, label, class);
    }

    #[inline]
    pub(crate) fn mark(&self, index: usize, label: &'static str, class: AnnotationClass) {
        self.record(
            AnnotationKind::Marker {
                time: self.times[index],
                value: self.values[index],
            },
            label,
            class,
        );
    }

    #[inline]
    pub(crate) fn span(&self, start: usize, stop: usize, label: &'static str) {
        self.record(
            AnnotationKind::Span {
                start: self.times[start],
                stop: self.times[stop],
            },
            label,
            AnnotationClass::Interval,
        );
    }
}
