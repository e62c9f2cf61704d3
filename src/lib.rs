#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::just_underscores_and_digits, clippy::len_without_is_empty)]

extern crate alloc;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub(crate) use utils::{PairedMoments, helper};

mod error;
pub use error::{MeasureError, MeasureResult};

mod config;
pub use config::{DEFAULT_LEADER_FRACTION, MIN_SAMPLES, SeriesConfig, TriggerLevel};

mod annotation;
pub use annotation::{Annotation, AnnotationClass, AnnotationKind};

mod level_search;
pub use level_search::{Direction, first_at_or_above, first_at_or_below, first_matching};

mod series;
pub use series::{Baseline, SampleSeries};

mod trigger;
pub use trigger::{Polarity, TriggerState};

mod edge;
pub use edge::{Edge, EdgeQuery, EdgeSense, SwitchingTime};

mod timing;
pub use timing::Deviation;

mod non_overlap;
pub use non_overlap::{GuardWindow, NonOverlap};
