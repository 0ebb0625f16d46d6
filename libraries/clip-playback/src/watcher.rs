//! Completion watcher - end-of-media handling
//!
//! Looping playback seeks back to the start and resumes; non-looping
//! playback invokes the completion callback once.

use crate::engine::MediaEngine;
use crate::events::{EventQueue, PlayerEvent};
use crate::session::{EndOfMediaSubscription, PlaybackSession};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, info};

/// Completion callback
pub type CompletionCallback = Rc<dyn Fn()>;

/// Watcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Never attached
    Idle,

    /// Subscribed to the session's end-of-media signal
    Watching,

    /// Unsubscribed; no callback fires until reattached
    Detached,
}

struct WatchRegistration<E: MediaEngine> {
    session: Rc<PlaybackSession<E>>,
    subscription: EndOfMediaSubscription<E::Handle>,
    alive: Rc<Cell<bool>>,
}

/// End-of-media observer for one session generation
///
/// A registration is bound to the generation that was current at attach
/// time. Signals from any other generation are dropped, and so is anything
/// delivered after [`detach`](Self::detach), checked through a disposal flag
/// at delivery time rather than by racing the engine's event source.
///
/// After a non-looping completion the watcher stays `Watching` but inert:
/// further signals for the same play-through are ignored. It completes again
/// only once the ended media is played again or the watcher is reattached.
pub struct CompletionWatcher<E: MediaEngine> {
    state: WatcherState,
    registration: Option<WatchRegistration<E>>,
    events: EventQueue,
}

impl<E: MediaEngine + 'static> CompletionWatcher<E> {
    pub fn new() -> Self {
        Self::with_events(EventQueue::default())
    }

    pub(crate) fn with_events(events: EventQueue) -> Self {
        Self {
            state: WatcherState::Idle,
            registration: None,
            events,
        }
    }

    /// Subscribe to the end of the session's current media
    ///
    /// Releases any previous registration first. Nothing is registered when
    /// the session has no handle loaded.
    pub fn attach(
        &mut self,
        session: &Rc<PlaybackSession<E>>,
        looping: bool,
        on_complete: CompletionCallback,
    ) {
        self.detach();

        let alive = Rc::new(Cell::new(true));
        let generation = session.generation();
        let handler = {
            let alive = Rc::clone(&alive);
            let session = Rc::downgrade(session);
            let events = self.events.clone();
            let mut loops = 0u64;
            let mut completed_playthrough = None;

            move || {
                if !alive.get() {
                    return;
                }
                let Some(session) = session.upgrade() else {
                    return;
                };
                if session.generation() != generation {
                    debug!("Dropping end-of-media signal from generation {}", generation);
                    return;
                }

                if looping {
                    loops += 1;
                    debug!("Generation {} looping (iteration {})", generation, loops);
                    session.seek_to_start();
                    session.resume();
                    events.push(PlayerEvent::Looped {
                        generation,
                        iteration: loops,
                    });
                } else if completed_playthrough != Some(session.playthrough()) {
                    completed_playthrough = Some(session.playthrough());
                    session.mark_ended();
                    info!("Generation {} played to the end", generation);
                    events.push(PlayerEvent::Completed { generation });
                    on_complete();
                }
            }
        };

        let Some(subscription) = session.subscribe_end_of_media(Box::new(handler)) else {
            debug!("Completion watcher not attached: no media loaded");
            return;
        };

        debug!(
            "Completion watcher attached to generation {} ({}, loop: {})",
            generation,
            subscription.token(),
            looping
        );
        self.registration = Some(WatchRegistration {
            session: Rc::clone(session),
            subscription,
            alive,
        });
        self.state = WatcherState::Watching;
    }

    /// Unsubscribe. Idempotent.
    pub fn detach(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.alive.set(false);
            debug!(
                "Completion watcher detached from generation {}",
                registration.subscription.generation()
            );
            registration.session.unsubscribe(registration.subscription);
        }
        self.state = WatcherState::Detached;
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Generation the current registration observes
    pub fn watched_generation(&self) -> Option<u64> {
        self.registration
            .as_ref()
            .map(|registration| registration.subscription.generation())
    }
}

impl<E: MediaEngine + 'static> Default for CompletionWatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: MediaEngine> Drop for CompletionWatcher<E> {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.alive.set(false);
            registration.session.unsubscribe(registration.subscription);
        }
    }
}
