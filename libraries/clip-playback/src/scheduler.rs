//! Periodic timer facility
//!
//! The controller never spawns threads or sleeps. Periodic progress polling
//! is registered with the host's event loop through [`Scheduler`].
//! [`IntervalScheduler`] is a ready-made implementation for hosts that pump
//! time themselves (a frame callback, a game loop, tests).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Callback invoked on every timer tick
pub type TickCallback = Box<dyn FnMut()>;

/// Registration returned by [`Scheduler::schedule_repeating`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Host event-loop timers
///
/// Same threading rules as [`MediaEngine`](crate::MediaEngine): `&self`
/// methods, and no internal borrow held while a tick runs, since ticks may
/// cancel or schedule timers.
pub trait Scheduler {
    /// Invoke `tick` every `interval` until cancelled
    fn schedule_repeating(&self, interval: Duration, tick: TickCallback) -> TimerToken;

    /// Stop a repeating timer. Unknown or already cancelled tokens are ignored.
    fn cancel(&self, token: TimerToken);
}

struct Timer {
    interval: Duration,
    next_due: Duration,
    // Taken out while the tick runs
    tick: Option<TickCallback>,
}

#[derive(Default)]
struct SchedulerInner {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerToken, Timer>,
}

/// Deterministic, host-pumped scheduler
///
/// Time only moves when [`advance_by`](Self::advance_by) is called. Due
/// timers fire in deadline order (ties in registration order), once for every
/// interval that elapsed.
#[derive(Default)]
pub struct IntervalScheduler {
    inner: RefCell<SchedulerInner>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of registered timers
    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Advance the clock by `elapsed`, firing every timer that falls due
    pub fn advance_by(&self, elapsed: Duration) {
        let target = self.now() + elapsed;

        while let Some((token, mut tick)) = self.take_next_due(target) {
            tick();

            // The tick may have cancelled its own timer
            let mut inner = self.inner.borrow_mut();
            if let Some(timer) = inner.timers.get_mut(&token) {
                timer.next_due += timer.interval;
                timer.tick = Some(tick);
            }
        }

        self.inner.borrow_mut().now = target;
    }

    fn take_next_due(&self, target: Duration) -> Option<(TimerToken, TickCallback)> {
        let mut inner = self.inner.borrow_mut();

        let token = inner
            .timers
            .iter()
            .filter(|(_, timer)| timer.tick.is_some() && timer.next_due <= target)
            .min_by_key(|(token, timer)| (timer.next_due, **token))
            .map(|(token, _)| *token)?;

        let timer = inner.timers.get_mut(&token)?;
        let due = timer.next_due;
        let tick = timer.tick.take()?;
        inner.now = due;

        Some((token, tick))
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&self, interval: Duration, tick: TickCallback) -> TimerToken {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let token = TimerToken(inner.next_id);
        // A zero interval would never let the clock move forward
        let interval = interval.max(Duration::from_nanos(1));
        let next_due = inner.now + interval;

        inner.timers.insert(
            token,
            Timer {
                interval,
                next_due,
                tick: Some(tick),
            },
        );
        token
    }

    fn cancel(&self, token: TimerToken) {
        let removed = self.inner.borrow_mut().timers.remove(&token);
        // Dropped outside the borrow: the callback may own scheduler clients
        drop(removed);
    }
}
