//! Session, sampler and watcher tests in isolation
//!
//! Exercise each building block without the controller, including the
//! races the controller relies on them to close.


use clip_playback::{
    CompletionWatcher, PlaybackSession, ProgressCell, ProgressSampler, SampleInterval, Scheduler,
    SessionState, TickCallback, TimerToken, WatcherState,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use test_helpers::{init_logging, resource, EngineCall, FakeEngine};

fn session() -> (Rc<FakeEngine>, Rc<PlaybackSession<FakeEngine>>) {
    init_logging();
    let engine = Rc::new(FakeEngine::new());
    let session = Rc::new(PlaybackSession::new(Rc::clone(&engine)));
    (engine, session)
}

/// Scheduler that keeps ticking cancelled timers, like a host loop that had
/// already dequeued the tick when the cancel arrived
#[derive(Default)]
struct LaggingScheduler {
    ticks: RefCell<Vec<(TimerToken, TickCallback)>>,
    cancelled: RefCell<Vec<TimerToken>>,
}

impl LaggingScheduler {
    fn fire_all(&self) {
        let mut ticks = self.ticks.take();
        for (_, tick) in &mut ticks {
            tick();
        }
        self.ticks.borrow_mut().extend(ticks);
    }
}

impl Scheduler for LaggingScheduler {
    fn schedule_repeating(&self, _interval: Duration, tick: TickCallback) -> TimerToken {
        let token = TimerToken::new(self.ticks.borrow().len() as u64 + 1);
        self.ticks.borrow_mut().push((token, tick));
        token
    }

    fn cancel(&self, token: TimerToken) {
        self.cancelled.borrow_mut().push(token);
    }
}

// ===== Playback Session =====

#[test]
fn test_session_load_plays_immediately() {
    let (engine, session) = session();

    let generation = session.load(resource("a"));

    assert_eq!(generation, 1);
    assert!(session.is_playing());
    assert!(engine.is_playing(1));
    assert_eq!(session.resource(), Some(resource("a")));
}

#[test]
fn test_session_load_releases_previous_handle_first() {
    let (engine, session) = session();
    session.load(resource("a"));
    engine.clear_calls();

    session.load(resource("b"));

    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Pause(1),
            EngineCall::Release(1),
            EngineCall::Create {
                handle: 2,
                resource: "https://media.example.com/b.mp4".to_string(),
            },
            EngineCall::Play(2),
        ]
    );
    assert_eq!(engine.live_handles(), 1);
}

#[test]
fn test_session_stop_is_idempotent_and_zeroes_progress() {
    let (engine, session) = session();
    session.load(resource("a"));
    engine.set_position(1, Duration::from_secs(4));
    assert_eq!(session.progress(), 0.4);
    engine.clear_calls();

    session.stop();
    session.stop();

    assert_eq!(engine.calls(), vec![EngineCall::Pause(1)]);
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.progress(), 0.0);
    // The handle survives a stop
    assert!(session.is_loaded());
}

#[test]
fn test_session_release_after_stop_skips_second_pause() {
    let (engine, session) = session();
    session.load(resource("a"));
    engine.clear_calls();

    session.stop();
    session.release();

    assert_eq!(engine.calls(), vec![EngineCall::Pause(1), EngineCall::Release(1)]);
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_session_operations_without_media_are_noops() {
    let (engine, session) = session();

    session.stop();
    session.seek_to_start();
    session.resume();
    session.release();

    assert!(engine.calls().is_empty());
    assert_eq!(session.progress(), 0.0);
    assert_eq!(session.current_time(), Duration::ZERO);
    assert_eq!(session.total_duration(), None);
    assert!(session.subscribe_end_of_media(Box::new(|| {})).is_none());
}

#[test]
fn test_session_prepare_does_not_play() {
    let (engine, session) = session();

    session.prepare(resource("a"));

    assert_eq!(session.state(), SessionState::Ready);
    assert!(!engine.is_playing(1));
}

#[test]
fn test_unsubscribe_of_previous_generation_is_not_forwarded() {
    let (engine, session) = session();
    session.load(resource("a"));
    let subscription = session
        .subscribe_end_of_media(Box::new(|| {}))
        .expect("media is loaded");
    assert_eq!(subscription.generation(), 1);

    session.load(resource("b"));
    engine.clear_calls();
    session.unsubscribe(subscription);

    assert!(engine.calls().is_empty());
    assert!(engine.misuse().is_empty());
}

// ===== Progress Sampler =====

#[test]
fn test_sampler_detach_suppresses_in_flight_tick() {
    let (engine, session) = session();
    session.load(resource("a"));
    engine.set_position(1, Duration::from_secs(5));

    let scheduler = Rc::new(LaggingScheduler::default());
    let progress = ProgressCell::new();
    let mut sampler = ProgressSampler::new(Rc::clone(&scheduler), Rc::new(progress.clone()));

    sampler.attach(&session, SampleInterval::default());
    scheduler.fire_all();
    assert_eq!(progress.get(), 0.5);

    sampler.detach();
    sampler.reset();
    engine.set_position(1, Duration::from_secs(9));
    scheduler.fire_all();

    assert_eq!(progress.get(), 0.0);
    assert_eq!(scheduler.cancelled.borrow().len(), 1);
}

#[test]
fn test_sampler_reattach_releases_previous_timer() {
    let (_engine, session) = session();
    session.load(resource("a"));

    let scheduler = Rc::new(LaggingScheduler::default());
    let writes = Rc::new(Cell::new(0u32));
    let sink = {
        let writes = Rc::clone(&writes);
        move |_: f64| writes.set(writes.get() + 1)
    };
    let mut sampler = ProgressSampler::new(Rc::clone(&scheduler), Rc::new(sink));

    sampler.attach(&session, SampleInterval::default());
    sampler.attach(&session, SampleInterval::default());
    scheduler.fire_all();

    // Two timers still tick on the lagging host, only one delivers
    assert_eq!(writes.get(), 1);
    assert_eq!(*scheduler.cancelled.borrow(), vec![TimerToken::new(1)]);
}

#[test]
fn test_sampler_detach_is_idempotent() {
    let (_engine, session) = session();
    session.load(resource("a"));

    let scheduler = Rc::new(LaggingScheduler::default());
    let mut sampler = ProgressSampler::new(Rc::clone(&scheduler), Rc::new(ProgressCell::new()));
    sampler.attach(&session, SampleInterval::default());

    sampler.detach();
    sampler.detach();

    assert!(!sampler.is_attached());
    assert_eq!(scheduler.cancelled.borrow().len(), 1);
}

#[test]
fn test_sampler_stops_when_session_is_gone() {
    let (_engine, session) = session();
    session.load(resource("a"));

    let scheduler = Rc::new(LaggingScheduler::default());
    let writes = Rc::new(Cell::new(0u32));
    let sink = {
        let writes = Rc::clone(&writes);
        move |_: f64| writes.set(writes.get() + 1)
    };
    let mut sampler = ProgressSampler::new(Rc::clone(&scheduler), Rc::new(sink));
    sampler.attach(&session, SampleInterval::default());

    drop(session);
    scheduler.fire_all();

    assert_eq!(writes.get(), 0);
}

// ===== Completion Watcher =====

#[test]
fn test_watcher_starts_idle_and_detach_is_terminal() {
    let (engine, session) = session();
    session.load(resource("a"));
    let mut watcher = CompletionWatcher::new();
    assert_eq!(watcher.state(), WatcherState::Idle);

    watcher.attach(&session, false, Rc::new(|| {}));
    assert_eq!(watcher.state(), WatcherState::Watching);
    assert_eq!(watcher.watched_generation(), Some(1));

    watcher.detach();
    watcher.detach();
    assert_eq!(watcher.state(), WatcherState::Detached);
    assert_eq!(watcher.watched_generation(), None);
    assert_eq!(engine.active_observers(), 0);
}

#[test]
fn test_watcher_rebind_discards_signal_of_old_session() {
    let (engine, session) = session();
    session.load(resource("a"));

    let completions = Rc::new(Cell::new(0u32));
    let on_complete = {
        let completions = Rc::clone(&completions);
        Rc::new(move || completions.set(completions.get() + 1))
    };

    let mut watcher = CompletionWatcher::new();
    watcher.attach(&session, false, on_complete.clone());

    watcher.detach();
    session.load(resource("b"));
    watcher.attach(&session, false, on_complete);
    assert_eq!(watcher.watched_generation(), Some(2));

    engine.deliver_late_end_of_media(1);
    assert_eq!(completions.get(), 0);

    engine.play_to_end(2);
    assert_eq!(completions.get(), 1);
}

#[test]
fn test_watcher_ignores_generation_swapped_underneath() {
    let (engine, session) = session();
    session.load(resource("a"));

    let completions = Rc::new(Cell::new(0u32));
    let mut watcher = CompletionWatcher::new();
    watcher.attach(&session, false, {
        let completions = Rc::clone(&completions);
        Rc::new(move || completions.set(completions.get() + 1))
    });

    // Session reloaded without going through the watcher
    session.load(resource("b"));
    engine.deliver_late_end_of_media(1);

    assert_eq!(completions.get(), 0);
}

#[test]
fn test_watcher_drop_unsubscribes() {
    let (engine, session) = session();
    session.load(resource("a"));

    {
        let mut watcher = CompletionWatcher::new();
        watcher.attach(&session, true, Rc::new(|| {}));
        assert_eq!(engine.active_observers(), 1);
    }

    assert_eq!(engine.active_observers(), 0);
}
