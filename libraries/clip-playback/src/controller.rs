//! Player controller - lifecycle orchestration
//!
//! Ties the session, sampler and watcher to the three hooks a hosting
//! rendering surface provides: activate, resource changed, deactivate.

use crate::{
    engine::MediaEngine,
    error::Result,
    events::{EventQueue, PlayerEvent},
    progress::{DiscardProgress, ProgressSink},
    sampler::ProgressSampler,
    scheduler::Scheduler,
    session::PlaybackSession,
    types::{PlayerConfig, Resource, SampleInterval},
    watcher::{CompletionCallback, CompletionWatcher, WatcherState},
};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Construction parameters of a player instance
///
/// Everything except the resource is fixed for the life of the controller.
#[derive(Clone)]
pub struct PlayerOptions {
    resource: Resource,
    progress: Rc<dyn ProgressSink>,
    sample_interval: SampleInterval,
    looping: bool,
    on_complete: CompletionCallback,
}

impl PlayerOptions {
    /// Options for `resource` with defaults: progress discarded, 100ms
    /// cadence, no loop, no-op completion
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            progress: Rc::new(DiscardProgress),
            sample_interval: SampleInterval::default(),
            looping: false,
            on_complete: Rc::new(|| {}),
        }
    }

    /// Options from a decoded [`PlayerConfig`]
    pub fn from_config(config: &PlayerConfig) -> Result<Self> {
        Ok(Self::new(config.resource()?)
            .with_sample_interval(config.sample_interval())
            .with_loop(config.loop_playback))
    }

    /// Where progress samples are written
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Rc::new(sink);
        self
    }

    /// Sampling cadence (clamped)
    pub fn with_sample_interval(mut self, interval: impl Into<SampleInterval>) -> Self {
        self.sample_interval = interval.into();
        self
    }

    /// Restart from the beginning instead of completing
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Invoked once when non-looping playback reaches the end
    pub fn with_on_complete(mut self, on_complete: impl Fn() + 'static) -> Self {
        self.on_complete = Rc::new(on_complete);
        self
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn sample_interval(&self) -> SampleInterval {
        self.sample_interval
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }
}

impl fmt::Debug for PlayerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerOptions")
            .field("resource", &self.resource)
            .field("sample_interval", &self.sample_interval)
            .field("looping", &self.looping)
            .finish_non_exhaustive()
    }
}

/// Whether the hosting component is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Inactive,
    Active,
}

/// Playback controller for one embedded player instance
///
/// Hooks run synchronously on the UI thread and never fail. Teardown order
/// on both reload and deactivation is watcher, then sampler, then handle, so
/// no callback ever observes a handle it was not registered against.
pub struct PlayerController<E: MediaEngine + 'static, S: Scheduler> {
    resource: Resource,
    sample_interval: SampleInterval,
    looping: bool,
    on_complete: CompletionCallback,

    session: Rc<PlaybackSession<E>>,
    sampler: ProgressSampler<S>,
    watcher: CompletionWatcher<E>,
    state: ControllerState,
    events: EventQueue,
}

impl<E: MediaEngine + 'static, S: Scheduler> PlayerController<E, S> {
    pub fn new(engine: Rc<E>, scheduler: Rc<S>, options: PlayerOptions) -> Self {
        let events = EventQueue::default();

        Self {
            resource: options.resource,
            sample_interval: options.sample_interval,
            looping: options.looping,
            on_complete: options.on_complete,
            session: Rc::new(PlaybackSession::new(engine)),
            sampler: ProgressSampler::new(scheduler, options.progress),
            watcher: CompletionWatcher::with_events(events.clone()),
            state: ControllerState::Inactive,
            events,
        }
    }

    // ===== Lifecycle Hooks =====

    /// Component appeared: load the resource and start playing
    ///
    /// No-op while already active.
    pub fn on_activate(&mut self) {
        if self.state == ControllerState::Active {
            debug!("Activate ignored: already active");
            return;
        }

        info!("Activating player for {}", self.resource);
        self.state = ControllerState::Active;
        self.events.push(PlayerEvent::Activated);
        self.start_session();
    }

    /// Resource changed: reload and restart playback
    ///
    /// While inactive the new resource is only recorded for the next
    /// activation. The current resource is a no-op.
    pub fn on_resource_changed(&mut self, resource: Resource) {
        if resource == self.resource {
            debug!("Resource unchanged ({}), nothing to reload", resource);
            return;
        }

        self.resource = resource;
        if self.state == ControllerState::Active {
            info!("Resource changed, reloading {}", self.resource);
            self.start_session();
        } else {
            debug!("Resource changed while inactive: {}", self.resource);
        }
    }

    /// Component disappeared: release every registration and reset progress
    ///
    /// Synchronous and complete: once this returns no sink write or
    /// completion callback can happen. Idempotent.
    pub fn on_deactivate(&mut self) {
        if self.state == ControllerState::Inactive {
            return;
        }

        info!("Deactivating player for {}", self.resource);
        self.watcher.detach();
        self.sampler.detach();
        self.session.stop();
        self.session.release();
        self.sampler.reset();

        self.state = ControllerState::Inactive;
        self.events.push(PlayerEvent::Deactivated);
    }

    fn start_session(&mut self) {
        self.watcher.detach();
        self.sampler.detach();

        // A fresh session's sink already reads 0 (construction or deactivation)
        let reloading = self.session.is_loaded();
        let generation = self.session.prepare(self.resource.clone());
        if reloading {
            self.sampler.reset();
        }

        self.sampler.attach(&self.session, self.sample_interval);
        self.watcher
            .attach(&self.session, self.looping, Rc::clone(&self.on_complete));

        self.events.push(PlayerEvent::Loaded {
            resource: self.resource.to_string(),
            generation,
        });
        self.session.play();
    }

    // ===== State Queries =====

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Active
    }

    /// Resource that is (or will be, on activation) loaded
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Last progress value written to the sink
    pub fn progress(&self) -> f64 {
        self.sampler.last_progress()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn sample_interval(&self) -> SampleInterval {
        self.sample_interval
    }

    pub fn watcher_state(&self) -> WatcherState {
        self.watcher.state()
    }

    pub fn session(&self) -> &PlaybackSession<E> {
        &self.session
    }

    // ===== Events =====

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        self.events.drain()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

impl<E: MediaEngine + 'static, S: Scheduler> Drop for PlayerController<E, S> {
    fn drop(&mut self) {
        self.on_deactivate();
    }
}
