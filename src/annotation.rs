use alloc::vec::Vec;
use core::cell::RefCell;

/// Where an annotation sits on the waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationKind<T> {
    /// A single sample
    Marker {
        /// Sample time
        time: T,
        /// Sample value
        value: T,
    },
    /// A horizontal level, e.g. a threshold
    Level {
        /// Level in sample units
        value: T,
    },
    /// A time interval, e.g. a rise time or a non-overlap window
    Span {
        /// Interval start time
        start: T,
        /// Interval stop time
        stop: T,
    },
}

/// Rendering class of an annotation, left to the plotter to map to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationClass {
    /// Baseline means and bands
    Baseline,
    /// Trigger points
    Trigger,
    /// Edge crossings
    Edge,
    /// Threshold levels
    Threshold,
    /// Measured intervals
    Interval,
}

/// An overlay event describing something the engine computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation<T> {
    /// Location on the waveform
    pub kind: AnnotationKind<T>,
    /// Short label
    pub label: &'static str,
    /// Rendering class
    pub class: AnnotationClass,
}

/// Collects annotations when enabled, drops them otherwise.
///
/// Interior mutability lets measurements take `&self`; it also makes the
/// owning series `!Sync`.
#[derive(Debug, Clone)]
pub(crate) struct Recorder<T> {
    enabled: bool,
    events: RefCell<Vec<Annotation<T>>>,
}

impl<T: Copy> Recorder<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            events: RefCell::new(Vec::new()),
        }
    }

    #[inline]
    pub fn record(&self, kind: AnnotationKind<T>, label: &'static str, class: AnnotationClass) {
        if self.enabled {
            self.events
                .borrow_mut()
                .push(Annotation { kind, label, class });
        }
    }

    pub fn snapshot(&self) -> Vec<Annotation<T>> {
        self.events.borrow().clone()
    }

    pub fn take(&mut self) -> Vec<Annotation<T>> {
        core::mem::take(self.events.get_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_recorder_drops_events() {
        let mut recorder = Recorder::new(false);
        recorder.record(
            AnnotationKind::Level { value: 1.0 },
            "level",
            AnnotationClass::Threshold,
        );
        assert!(recorder.snapshot().is_empty());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn enabled_recorder_keeps_order_and_drains() {
        let mut recorder = Recorder::new(true);
        recorder.record(
            AnnotationKind::Level { value: 1.0 },
            "first",
            AnnotationClass::Threshold,
        );
        recorder.record(
            AnnotationKind::Span {
                start: 0.0,
                stop: 2.0,
            },
            "second",
            AnnotationClass::Interval,
        );
        let events = recorder.snapshot();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label, "first");
        assert_eq!(events[1].class, AnnotationClass::Interval);

        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.snapshot().is_empty());
    }
}
