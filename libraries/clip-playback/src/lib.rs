//! Clip Player - Playback Controller
//!
//! Platform-agnostic playback-state controller for an embedded video player.
//!
//! This crate provides:
//! - Playback session lifecycle (load, replace, stop, release)
//! - Normalized progress (0.0-1.0) sampled at a configurable cadence
//! - Optional looping
//! - A completion callback fired once per non-looping playback
//!
//! # Architecture
//!
//! `clip-playback` does no decoding and no rendering:
//! - The media engine (AVFoundation, GStreamer, libmpv, ...) is reached
//!   through the [`MediaEngine`] trait
//! - Periodic timers come from the host event loop through [`Scheduler`]
//! - The hosting UI drives [`PlayerController`] with three hooks:
//!   `on_activate`, `on_resource_changed`, `on_deactivate`
//!
//! Everything runs on one thread. The controller never spawns threads and
//! never blocks.
//!
//! # Example
//!
//! ```rust
//! use clip_playback::{
//!     EndOfMediaCallback, IntervalScheduler, MediaEngine, PlayerController, PlayerOptions,
//!     ProgressCell, Resource, SubscriptionToken,
//! };
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! // A stand-in engine: ten seconds of media, always five seconds in
//! struct HalfwayEngine;
//!
//! impl MediaEngine for HalfwayEngine {
//!     type Handle = u32;
//!
//!     fn create_handle(&self, _resource: &Resource) -> u32 { 1 }
//!     fn play(&self, _handle: &u32) {}
//!     fn pause(&self, _handle: &u32) {}
//!     fn seek(&self, _handle: &u32, _position: Duration) {}
//!     fn current_time(&self, _handle: &u32) -> Duration { Duration::from_secs(5) }
//!     fn total_duration(&self, _handle: &u32) -> Option<Duration> {
//!         Some(Duration::from_secs(10))
//!     }
//!     fn on_end_of_media(&self, _handle: &u32, _callback: EndOfMediaCallback) -> SubscriptionToken {
//!         SubscriptionToken::new(1)
//!     }
//!     fn remove_end_of_media_observer(&self, _handle: &u32, _token: SubscriptionToken) {}
//!     fn release_handle(&self, _handle: u32) {}
//! }
//!
//! let scheduler = Rc::new(IntervalScheduler::new());
//! let progress = ProgressCell::new();
//! let completed = Rc::new(Cell::new(false));
//!
//! let options = PlayerOptions::new(Resource::parse("https://example.com/clip.mp4").unwrap())
//!     .with_progress(progress.clone())
//!     .with_sample_interval(Duration::from_millis(100))
//!     .with_on_complete({
//!         let completed = Rc::clone(&completed);
//!         move || completed.set(true)
//!     });
//!
//! let mut player = PlayerController::new(Rc::new(HalfwayEngine), Rc::clone(&scheduler), options);
//! player.on_activate();
//!
//! scheduler.advance_by(Duration::from_millis(100));
//! assert_eq!(progress.get(), 0.5);
//!
//! player.on_deactivate();
//! assert_eq!(progress.get(), 0.0);
//! assert!(!completed.get());
//! ```

mod controller;
mod engine;
mod error;
mod events;
mod progress;
mod sampler;
mod scheduler;
mod session;
pub mod types;
mod watcher;

// Public exports
pub use controller::{ControllerState, PlayerController, PlayerOptions};
pub use engine::{EndOfMediaCallback, MediaEngine, SubscriptionToken};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use progress::{normalized_progress, DiscardProgress, ProgressCell, ProgressSink};
pub use sampler::ProgressSampler;
pub use scheduler::{IntervalScheduler, Scheduler, TickCallback, TimerToken};
pub use session::{EndOfMediaSubscription, PlaybackSession, SessionState};
pub use types::{PlayerConfig, Resource, SampleInterval};
pub use watcher::{CompletionCallback, CompletionWatcher, WatcherState};
