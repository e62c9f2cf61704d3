use num_traits::Float;

/// Default fraction of the record used for the leading and trailing baselines
pub const DEFAULT_LEADER_FRACTION: f64 = 0.099;

/// Minimum number of samples a series must hold
pub const MIN_SAMPLES: usize = 4;

/// Deviation from the leading baseline that declares a trigger
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerLevel<T> {
    /// Multiple of the leading standard deviation
    Sigma(T),
    /// Absolute offset in sample units
    Absolute(T),
}

impl<T: Float> TriggerLevel<T> {
    /// Resolves the level to an offset from the baseline
    ///
    /// # Arguments
    ///
    /// * `stdev_in` - Standard deviation of the leading baseline
    ///
    /// # Returns
    ///
    /// * `T` - The trigger offset, always non-negative
    pub fn offset(&self, stdev_in: T) -> T {
        match *self {
            TriggerLevel::Sigma(sigma) => (sigma * stdev_in).abs(),
            TriggerLevel::Absolute(level) => level.abs(),
        }
    }
}

impl<T: Float> Default for TriggerLevel<T> {
    fn default() -> Self {
        let _3 = T::one() + T::one() + T::one();
        TriggerLevel::Sigma(_3)
    }
}

/// Configuration of a [`SampleSeries`](crate::SampleSeries)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesConfig<T> {
    /// Fraction of samples at each end used for baseline statistics
    leader_fraction: f64,
    /// Level used by the sigma trigger
    trigger_level: TriggerLevel<T>,
    /// Whether annotation events are recorded
    annotate: bool,
}

impl<T: Float> SeriesConfig<T> {
    /// Creates a configuration with the default leader fraction, a 3 sigma
    /// trigger and annotations disabled
    pub fn new() -> Self {
        Self {
            leader_fraction: DEFAULT_LEADER_FRACTION,
            trigger_level: TriggerLevel::default(),
            annotate: false,
        }
    }

    /// Returns the leader fraction
    pub const fn leader_fraction(&self) -> f64 {
        self.leader_fraction
    }

    /// Sets the leader fraction, validated when the series is built
    ///
    /// # Arguments
    ///
    /// * `leader_fraction` - Fraction of the record in the open interval (0, 0.5)
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The configuration
    pub const fn set_leader_fraction(&mut self, leader_fraction: f64) -> &mut Self {
        self.leader_fraction = leader_fraction;
        self
    }

    /// Returns the trigger level
    pub const fn trigger_level(&self) -> TriggerLevel<T> {
        self.trigger_level
    }

    /// Sets the trigger level used by [`SampleSeries::trigger`](crate::SampleSeries::trigger)
    ///
    /// # Arguments
    ///
    /// * `trigger_level` - Sigma multiple or absolute offset
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The configuration
    pub fn set_trigger_level(&mut self, trigger_level: TriggerLevel<T>) -> &mut Self {
        self.trigger_level = trigger_level;
        self
    }

    /// Returns whether annotation events are recorded
    pub const fn annotate(&self) -> bool {
        self.annotate
    }

    /// Enables or disables annotation recording
    ///
    /// Recorded events accumulate on the series across every trigger, edge and
    /// settling computation until drained with
    /// [`SampleSeries::take_annotations`](crate::SampleSeries::take_annotations).
    /// Long-lived series that keep measuring should drain them regularly.
    ///
    /// # Arguments
    ///
    /// * `annotate` - `true` to record annotation events
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The configuration
    pub const fn set_annotate(&mut self, annotate: bool) -> &mut Self {
        self.annotate = annotate;
        self
    }

    /// Checks that the leader fraction lies in (0, 0.5)
    pub(crate) fn leader_fraction_is_valid(&self) -> bool {
        self.leader_fraction > 0.0 && self.leader_fraction < 0.5
    }
}

impl<T: Float> Default for SeriesConfig<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn defaults() {
        let config = SeriesConfig::<f64>::default();
        assert_approx_eq!(config.leader_fraction(), 0.099);
        assert_eq!(config.trigger_level(), TriggerLevel::Sigma(3.0));
        assert!(!config.annotate());
        assert!(config.leader_fraction_is_valid());
    }

    #[test]
    fn setters_chain() {
        let mut config = SeriesConfig::<f64>::new();
        config
            .set_leader_fraction(0.5)
            .set_trigger_level(TriggerLevel::Absolute(-0.2))
            .set_annotate(true);
        assert!(!config.leader_fraction_is_valid());
        assert!(config.annotate());
        assert_approx_eq!(config.trigger_level().offset(10.0), 0.2);
    }

    #[test]
    fn sigma_offset_scales_stdev() {
        assert_approx_eq!(TriggerLevel::Sigma(2.5).offset(0.4), 1.0);

        let mut config = SeriesConfig::<f64>::new();
        config.set_leader_fraction(0.0);
        assert!(!config.leader_fraction_is_valid());
    }
}
