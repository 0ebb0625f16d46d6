//! Progress sampler - periodic progress polling
//!
//! Polls the session on a fixed cadence and writes normalized progress to
//! the sink. It is the sink's only writer.

use crate::engine::MediaEngine;
use crate::progress::ProgressSink;
use crate::scheduler::{Scheduler, TimerToken};
use crate::session::PlaybackSession;
use crate::types::SampleInterval;
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

struct SamplerRegistration {
    timer: TimerToken,
    // Cleared on detach; checked before every delivery
    alive: Rc<Cell<bool>>,
}

/// Periodic progress reporter
///
/// At most one timer registration is outstanding: `attach` always releases
/// the previous one first. After `detach` returns the sink is never written
/// by a tick again, even if the host scheduler still runs a tick it had
/// already dequeued.
pub struct ProgressSampler<S: Scheduler> {
    scheduler: Rc<S>,
    sink: Rc<dyn ProgressSink>,
    last: Rc<Cell<f64>>,
    registration: Option<SamplerRegistration>,
}

impl<S: Scheduler> ProgressSampler<S> {
    pub fn new(scheduler: Rc<S>, sink: Rc<dyn ProgressSink>) -> Self {
        Self {
            scheduler,
            sink,
            last: Rc::new(Cell::new(0.0)),
            registration: None,
        }
    }

    /// Start polling `session` every `interval`
    pub fn attach<E>(&mut self, session: &Rc<PlaybackSession<E>>, interval: SampleInterval)
    where
        E: MediaEngine + 'static,
    {
        self.detach();

        let alive = Rc::new(Cell::new(true));
        let tick = {
            let alive = Rc::clone(&alive);
            let session = Rc::downgrade(session);
            let sink = Rc::clone(&self.sink);
            let last = Rc::clone(&self.last);

            move || {
                if !alive.get() {
                    return;
                }
                let Some(session) = session.upgrade() else {
                    return;
                };

                let progress = session.progress();
                last.set(progress);
                sink.set_progress(progress);
            }
        };

        let timer = self
            .scheduler
            .schedule_repeating(interval.as_duration(), Box::new(tick));
        debug!(
            "Progress sampler attached ({}, every {:?})",
            timer,
            interval.as_duration()
        );

        self.registration = Some(SamplerRegistration { timer, alive });
    }

    /// Stop polling. Idempotent.
    pub fn detach(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.alive.set(false);
            self.scheduler.cancel(registration.timer);
            debug!("Progress sampler detached ({})", registration.timer);
        }
    }

    /// Write 0 to the sink
    pub fn reset(&self) {
        self.last.set(0.0);
        self.sink.set_progress(0.0);
    }

    pub fn is_attached(&self) -> bool {
        self.registration.is_some()
    }

    /// Last value written to the sink
    pub fn last_progress(&self) -> f64 {
        self.last.get()
    }
}

impl<S: Scheduler> Drop for ProgressSampler<S> {
    fn drop(&mut self) {
        self.detach();
    }
}
