//! Platform media engine trait
//!
//! Abstracts the decoding/playback engine (AVFoundation, GStreamer, libmpv, a
//! browser `<video>` element, ...) so the controller can run on any of them.

use crate::types::Resource;
use std::fmt;
use std::time::Duration;

/// Callback invoked when a handle reaches the end of its media
pub type EndOfMediaCallback = Box<dyn FnMut()>;

/// Registration returned by [`MediaEngine::on_end_of_media`]
///
/// Engines mint these; the controller only stores and returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Platform media engine
///
/// All calls happen on the UI/event thread. Methods take `&self` because the
/// controller calls back into the engine from inside engine-fired callbacks
/// (a loop restart seeks and resumes from the end-of-media handler), so
/// implementations use interior mutability and must not hold internal
/// borrows while invoking a callback.
///
/// Resolution failures are the engine's own business: a handle for an
/// unplayable resource simply never advances and reports no duration.
pub trait MediaEngine {
    /// Opaque per-load handle
    type Handle: Clone + fmt::Debug;

    /// Load `resource` into a fresh handle (does not start playback)
    fn create_handle(&self, resource: &Resource) -> Self::Handle;

    /// Start or resume playback
    fn play(&self, handle: &Self::Handle);

    /// Pause playback, keeping the current position
    fn pause(&self, handle: &Self::Handle);

    /// Move the playhead to `position` from the start of the media
    fn seek(&self, handle: &Self::Handle, position: Duration);

    /// Elapsed playback time
    fn current_time(&self, handle: &Self::Handle) -> Duration;

    /// Total media duration, `None` while unknown (still loading, live stream,
    /// unresolvable resource)
    fn total_duration(&self, handle: &Self::Handle) -> Option<Duration>;

    /// Observe the end-of-media signal of `handle`
    ///
    /// The observer stays registered until removed and fires once each time
    /// playback reaches the end of the media.
    fn on_end_of_media(
        &self,
        handle: &Self::Handle,
        callback: EndOfMediaCallback,
    ) -> SubscriptionToken;

    /// Remove an end-of-media observer. Unknown tokens are ignored.
    fn remove_end_of_media_observer(&self, handle: &Self::Handle, token: SubscriptionToken);

    /// Release every resource held by `handle`
    fn release_handle(&self, handle: Self::Handle);
}
