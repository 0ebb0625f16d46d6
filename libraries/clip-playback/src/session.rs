//! Playback session - owns the engine handle
//!
//! One session per controller. Every load replaces the handle wholesale and
//! bumps the session generation, which scopes end-of-media subscriptions to
//! the handle they were made against.

use crate::engine::{EndOfMediaCallback, MediaEngine, SubscriptionToken};
use crate::progress::normalized_progress;
use crate::types::Resource;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No handle loaded
    Idle,

    /// Handle created, playback not started yet
    Ready,

    /// Playing
    Playing,

    /// Reached end of media (non-looping)
    Ended,

    /// Stopped by the host; observable progress reads 0
    Stopped,
}

struct LoadedMedia<H> {
    resource: Resource,
    handle: H,
}

/// End-of-media registration bound to one session generation
#[derive(Debug, Clone)]
pub struct EndOfMediaSubscription<H> {
    handle: H,
    token: SubscriptionToken,
    generation: u64,
}

impl<H> EndOfMediaSubscription<H> {
    pub fn token(&self) -> SubscriptionToken {
        self.token
    }

    /// Generation of the handle this subscription observes
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Current engine handle plus its playback state
///
/// Interior mutability keeps every method `&self`: engine callbacks reach
/// the session through a shared reference while the controller holds it too.
/// Engine calls are made with no `RefCell` borrow held, so an engine that
/// fires callbacks synchronously cannot trip a double borrow.
pub struct PlaybackSession<E: MediaEngine> {
    engine: Rc<E>,
    current: RefCell<Option<LoadedMedia<E::Handle>>>,
    state: Cell<SessionState>,
    generation: Cell<u64>,
    // Bumped when an ended handle is played again
    playthrough: Cell<u64>,
}

impl<E: MediaEngine> PlaybackSession<E> {
    pub fn new(engine: Rc<E>) -> Self {
        Self {
            engine,
            current: RefCell::new(None),
            state: Cell::new(SessionState::Idle),
            generation: Cell::new(0),
            playthrough: Cell::new(0),
        }
    }

    /// Load `resource` and start playing immediately
    ///
    /// Any previous handle is released first. Its end-of-media subscriptions
    /// go with it, so callers must re-subscribe against the new generation.
    pub fn load(&self, resource: Resource) -> u64 {
        let generation = self.prepare(resource);
        self.play();
        generation
    }

    /// Replace the handle with a fresh one for `resource` without starting
    /// playback. Returns the new generation.
    pub fn prepare(&self, resource: Resource) -> u64 {
        self.release();

        let handle = self.engine.create_handle(&resource);
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        debug!("Session generation {} loaded {}", generation, resource);
        *self.current.borrow_mut() = Some(LoadedMedia { resource, handle });
        self.state.set(SessionState::Ready);

        generation
    }

    /// Start or resume playback of the current handle
    ///
    /// Playing a handle that already ended starts a new play-through, which
    /// can complete again.
    pub fn play(&self) {
        if let Some(handle) = self.handle() {
            if self.state.get() == SessionState::Ended {
                self.playthrough.set(self.playthrough.get() + 1);
                debug!("Session generation {} replaying", self.generation.get());
            }
            self.state.set(SessionState::Playing);
            self.engine.play(&handle);
        }
    }

    /// Pause playback and reset observable progress to 0
    ///
    /// Keeps the handle. Idempotent.
    pub fn stop(&self) {
        match self.state.get() {
            SessionState::Idle | SessionState::Stopped => {}
            _ => {
                if let Some(handle) = self.handle() {
                    self.engine.pause(&handle);
                }
                self.state.set(SessionState::Stopped);
                debug!("Session generation {} stopped", self.generation.get());
            }
        }
    }

    /// Move the playhead back to the beginning
    pub fn seek_to_start(&self) {
        if let Some(handle) = self.handle() {
            self.engine.seek(&handle, Duration::ZERO);
        }
    }

    /// Resume after [`seek_to_start`](Self::seek_to_start)
    pub fn resume(&self) {
        self.play();
    }

    /// Pause and release the handle entirely
    ///
    /// A stopped handle is already paused and is released without a second
    /// pause.
    pub fn release(&self) {
        let previous = self.current.borrow_mut().take();

        if let Some(media) = previous {
            debug!(
                "Releasing session generation {} ({})",
                self.generation.get(),
                media.resource
            );
            if self.state.get() != SessionState::Stopped {
                self.engine.pause(&media.handle);
            }
            self.engine.release_handle(media.handle);
        }
        self.state.set(SessionState::Idle);
    }

    /// Observe end of media on the current handle
    ///
    /// Returns `None` when nothing is loaded.
    pub fn subscribe_end_of_media(
        &self,
        callback: EndOfMediaCallback,
    ) -> Option<EndOfMediaSubscription<E::Handle>> {
        let handle = self.handle()?;
        let token = self.engine.on_end_of_media(&handle, callback);

        Some(EndOfMediaSubscription {
            handle,
            token,
            generation: self.generation.get(),
        })
    }

    /// Remove an end-of-media observer
    ///
    /// Subscriptions of an older generation were dropped together with their
    /// released handle, so only current-generation tokens reach the engine.
    pub fn unsubscribe(&self, subscription: EndOfMediaSubscription<E::Handle>) {
        if subscription.generation == self.generation.get() && self.is_loaded() {
            self.engine
                .remove_end_of_media_observer(&subscription.handle, subscription.token);
        }
    }

    /// Play-throughs of ended media restarted so far
    pub(crate) fn playthrough(&self) -> u64 {
        self.playthrough.get()
    }

    pub(crate) fn mark_ended(&self) {
        if self.state.get() == SessionState::Playing {
            self.state.set(SessionState::Ended);
        }
    }

    /// Normalized progress of the current handle in [0.0, 1.0]
    ///
    /// 0.0 when idle, stopped, or while the duration is unknown.
    pub fn progress(&self) -> f64 {
        match self.state.get() {
            SessionState::Idle | SessionState::Stopped => 0.0,
            _ => normalized_progress(self.current_time(), self.total_duration()),
        }
    }

    pub fn current_time(&self) -> Duration {
        self.handle()
            .map(|handle| self.engine.current_time(&handle))
            .unwrap_or(Duration::ZERO)
    }

    pub fn total_duration(&self) -> Option<Duration> {
        self.handle()
            .and_then(|handle| self.engine.total_duration(&handle))
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn is_playing(&self) -> bool {
        self.state.get() == SessionState::Playing
    }

    pub fn is_loaded(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Generation of the current (or last) handle; 0 before the first load
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn resource(&self) -> Option<Resource> {
        self.current
            .borrow()
            .as_ref()
            .map(|media| media.resource.clone())
    }

    fn handle(&self) -> Option<E::Handle> {
        self.current
            .borrow()
            .as_ref()
            .map(|media| media.handle.clone())
    }
}
