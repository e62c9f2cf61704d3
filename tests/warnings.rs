use std::{cell::RefCell, sync::Once};

use log::{Level, LevelFilter, Log, Metadata, Record};
use waveform_measure::{
    Deviation, GuardWindow, MeasureError, SampleSeries, SeriesConfig, TriggerLevel,
};

thread_local! {
    static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

struct Capture;

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: Capture = Capture;
static INIT: Once = Once::new();

/// Runs `f` and returns its result with the warnings it logged on this thread
fn captured<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Warn);
        }
    });
    WARNINGS.with(|w| w.borrow_mut().clear());
    let result = f();
    let warnings = WARNINGS.with(|w| w.borrow_mut().drain(..).collect());
    (result, warnings)
}

fn series(values: Vec<f64>) -> SampleSeries<f64> {
    let times = (0..values.len()).map(|i| i as f64).collect();
    let mut config = SeriesConfig::new();
    config
        .set_leader_fraction(0.2)
        .set_trigger_level(TriggerLevel::Absolute(0.5));
    SampleSeries::with_config(times, values, config).unwrap()
}

#[test]
fn never_outside_limit_warns() {
    let s = series(vec![1.0, 1.0, 1.1, 0.9, 1.0, 1.05, 0.95, 1.0, 1.0, 1.0]);
    let (result, warnings) = captured(|| s.settling_time_outside_limit(0.5));
    assert_eq!(result.unwrap(), None);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("never leaves"));
}

#[test]
fn settling_time_warnings_differ() {
    let s = series(vec![0.0, 0.0, 0.0, 1.0, 1.5, 0.8, 1.0, 1.0, 1.0, 1.3]);
    let (never_settled, settled_warnings) = captured(|| s.settling_time(0.9, 1.1, None));
    assert_eq!(never_settled.unwrap(), None);

    let (never_left, left_warnings) = captured(|| s.settling_time(-5.0, 5.0, None));
    assert_eq!(never_left.unwrap(), None);

    assert_eq!(settled_warnings.len(), 1);
    assert_eq!(left_warnings.len(), 1);
    assert_ne!(settled_warnings[0], left_warnings[0]);
}

#[test]
fn max_deviation_never_settling_warns() {
    let s = series(vec![0.0, 0.0, 3.0, 2.0, -1.5, 0.8, -0.2, 0.1, 0.0, 0.9]);
    let measure = || s.settling_time_from_max_deviation(0.5, Deviation::Positive);
    let (result, warnings) = captured(measure);
    assert_eq!(result.unwrap(), None);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn missing_switching_crossing_warns() {
    let s = series(vec![0.0, 0.0, 2.0, 4.0, 6.0, 8.0, 8.0, 8.0, 8.0, 8.0]);
    let (result, warnings) = captured(|| s.sw_rise_time(0.1, 0.9, 10.0, 0.0));
    assert_eq!(result.unwrap(), None);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn missing_nol_edge_warns_without_error() {
    let s = series(vec![0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let (result, warnings) = captured(|| s.sw_nol_fall(0.5, 10.0, 0.0));
    let nol = result.unwrap();
    assert_eq!(nol.low_side, GuardWindow::Unterminated);
    assert_eq!(nol.high_side, GuardWindow::Unterminated);
    assert_eq!(warnings.len(), 1);
}

#[test]
fn negative_vth_fails_before_scanning() {
    let s = series(vec![0.0, 0.0, 1.0, 2.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let (result, warnings) = captured(|| s.sw_nol_rise(-0.5, 10.0, 0.0));
    assert!(matches!(
        result.unwrap_err(),
        MeasureError::InvalidParameter { name: "vth", .. }
    ));
    assert!(warnings.is_empty());
}

#[test]
fn non_stationary_baseline_warns() {
    let (s, warnings) = captured(|| series(vec![0.0; 10]).with_stationarity(false));
    assert_eq!(s.stationary(), Some(false));
    assert_eq!(warnings.len(), 1);

    let (_, warnings) = captured(|| series(vec![0.0; 10]).with_stationarity(true));
    assert!(warnings.is_empty());
}
