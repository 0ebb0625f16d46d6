//! Progress output
//!
//! Progress is written to a caller-owned [`ProgressSink`]. Only the
//! [`ProgressSampler`](crate::ProgressSampler) writes to it; the controller
//! never reads it back as playback input.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Receiver of normalized progress values in [0.0, 1.0]
pub trait ProgressSink {
    fn set_progress(&self, progress: f64);
}

impl<F: Fn(f64)> ProgressSink for F {
    fn set_progress(&self, progress: f64) {
        self(progress);
    }
}

/// Shared numeric cell, the two-way binding a UI reads progress from
///
/// Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct ProgressCell(Rc<Cell<f64>>);

impl ProgressCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last written progress
    pub fn get(&self) -> f64 {
        self.0.get()
    }
}

impl ProgressSink for ProgressCell {
    fn set_progress(&self, progress: f64) {
        self.0.set(progress);
    }
}

/// Sink that drops every sample (progress is not observed)
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardProgress;

impl ProgressSink for DiscardProgress {
    fn set_progress(&self, _progress: f64) {}
}

/// Normalize elapsed time against total duration
///
/// Unknown or zero duration yields 0.0 instead of dividing by zero. The
/// ratio is clamped to [0.0, 1.0] to absorb rounding at end of media.
pub fn normalized_progress(elapsed: Duration, total: Option<Duration>) -> f64 {
    let Some(total) = total.filter(|total| !total.is_zero()) else {
        return 0.0;
    };

    let ratio = elapsed.as_secs_f64() / total.as_secs_f64();
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
