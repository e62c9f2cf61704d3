use thiserror::Error;

/// Result alias used throughout the measurement engine
pub type MeasureResult<V> = core::result::Result<V, MeasureError>;

/// Errors raised by the measurement engine.
///
/// Only conditions that make a measurement structurally meaningless are errors.
/// A measurement that merely does not apply to a given capture (a waveform that
/// never settles, a guard band that is never entered) is reported as `None`
/// together with a `log` warning instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// `times` and `values` differ in length
    #[error("times and values differ in length: {times} times, {values} values")]
    LengthMismatch {
        /// Number of time stamps
        times: usize,
        /// Number of samples
        values: usize,
    },
    /// Record is too short to measure
    #[error("series has {len} samples, at least {min} are required")]
    TooFewSamples {
        /// Number of samples supplied
        len: usize,
        /// Minimum number of samples
        min: usize,
    },
    /// Leader fraction outside of the open interval (0, 0.5)
    #[error("leader fraction must lie in (0, 0.5)")]
    InvalidLeaderFraction,
    /// Leader window holds no samples, baseline statistics are undefined
    #[error("baseline undefined: leader window of a {len} sample series is empty")]
    BaselineUndefined {
        /// Number of samples in the series
        len: usize,
    },
    /// A required parameter was not supplied
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),
    /// `vlow` is not strictly below `vhigh`
    #[error("vlow must be strictly below vhigh")]
    InvalidRange,
    /// A parameter has a value the measurement can not use
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },
    /// A sample index lies outside of the series
    #[error("index {index} out of range for a series of {len} samples")]
    OutOfRange {
        /// Offending index
        index: usize,
        /// Number of samples in the series
        len: usize,
    },
    /// No sample deviates from the baseline by more than the trigger level
    #[error("no trigger found")]
    NoTriggerFound,
    /// Leading and trailing baselines are equal, no 10/90 trigger exists
    #[error("no 10/90 trigger found")]
    NoTrigger1090,
    /// The 50% level crossing needed as an anchor does not exist
    #[error("50% edge not found")]
    Edge50NotFound,
    /// A level crossing required by the measurement does not exist
    #[error("level crossing not found")]
    CrossingNotFound,
    /// Linear regression window is degenerate
    #[error("degenerate regression window of {len} samples")]
    DegenerateRegression {
        /// Number of samples in the window
        len: usize,
    },
    /// A constant could not be represented in the sample type
    #[error("numeric conversion failed")]
    NumericCast,
}
