//! Player events
//!
//! Lifecycle events queued for the host to drain at its own pace.
//! Progress samples are not queued, they go straight to the
//! [`ProgressSink`](crate::ProgressSink).

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Component became active
    Activated,

    /// A resource was loaded into a fresh engine handle
    Loaded {
        /// Resource locator
        resource: String,
        /// Session generation the handle belongs to
        generation: u64,
    },

    /// Looping playback restarted from the beginning
    Looped {
        generation: u64,
        /// 1 for the first restart of this generation
        iteration: u64,
    },

    /// Non-looping playback reached the end
    Completed { generation: u64 },

    /// Component became inactive, all registrations released
    Deactivated,
}

/// Shared FIFO of pending events
///
/// Cloned into the completion handler so engine-fired callbacks can
/// report without reaching back into the controller.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventQueue(Rc<RefCell<Vec<PlayerEvent>>>);

impl EventQueue {
    pub(crate) fn push(&self, event: PlayerEvent) {
        self.0.borrow_mut().push(event);
    }

    pub(crate) fn drain(&self) -> Vec<PlayerEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
