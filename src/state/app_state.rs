//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::engine::{
    EngineError, PhaseTimerEngine, RunState, StateSnapshot, SuspensionTracker, TimerConfig,
    TimerEvent,
};

/// Clock gap at or above which a tick-loop wake is treated as a suspension
/// episode instead of ordinary scheduling jitter
pub const SUSPEND_GAP_MS: u64 = 5_000;

/// Errors surfaced by state-layer commands
#[derive(Debug, Error)]
pub enum StateError {
    /// The engine rejected the operation in its current run-state
    #[error(transparent)]
    Rejected(#[from] EngineError),
    /// A state lock was poisoned
    #[error("failed to lock {0} state")]
    Lock(&'static str),
}

/// Main application state that owns the timer engine and its suspension
/// tracking
#[derive(Debug)]
pub struct AppState {
    /// The phase timer state machine
    engine: Arc<Mutex<PhaseTimerEngine>>,
    /// Pending suspension episode, armed only while the engine runs
    tracker: Arc<Mutex<SuspensionTracker>>,
    /// Tick baseline for the 1 Hz driver; reconciliation resets it so a tick
    /// arriving right after a reconcile cannot double-count
    tick_baseline_ms: Arc<Mutex<Option<u64>>>,
    /// Immutable timer configuration for this session
    pub timer_config: TimerConfig,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Phase-boundary events for alert sinks
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Continuous snapshot feed
    pub snapshot_tx: watch::Sender<StateSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<StateSnapshot>,
}

impl AppState {
    /// Create a new AppState around a fresh engine
    pub fn new(timer_config: TimerConfig, port: u16, host: String) -> Self {
        let engine = PhaseTimerEngine::new(timer_config);
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            tracker: Arc::new(Mutex::new(SuspensionTracker::new())),
            tick_baseline_ms: Arc::new(Mutex::new(None)),
            timer_config,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Subscribe to phase-boundary events
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Apply a command to the engine and publish the outcome
    fn apply<F>(&self, action: &str, operation: F) -> Result<StateSnapshot, StateError>
    where
        F: FnOnce(&mut PhaseTimerEngine) -> Result<Vec<TimerEvent>, EngineError>,
    {
        let mut engine = self.engine.lock().map_err(|_| StateError::Lock("engine"))?;
        let events = operation(&mut engine)?;
        let snapshot = engine.snapshot();
        drop(engine); // Release the lock early

        self.record_action(action);
        self.publish(&events, snapshot);
        Ok(snapshot)
    }

    /// Start the timer
    pub fn start(&self) -> Result<StateSnapshot, StateError> {
        info!("Starting timer");
        self.apply("start", |engine| engine.start().map(|_| Vec::new()))
    }

    /// Pause the timer
    pub fn pause(&self) -> Result<StateSnapshot, StateError> {
        info!("Pausing timer");
        self.apply("pause", |engine| engine.pause().map(|_| Vec::new()))
    }

    /// Resume the timer
    pub fn resume(&self) -> Result<StateSnapshot, StateError> {
        info!("Resuming timer");
        self.apply("resume", |engine| engine.resume().map(|_| Vec::new()))
    }

    /// Reset the timer to the idle ready snapshot and disarm suspension
    /// tracking
    pub fn reset(&self) -> Result<StateSnapshot, StateError> {
        info!("Resetting timer");
        if let Ok(mut tracker) = self.tracker.lock() {
            tracker.clear();
        }
        if let Ok(mut baseline) = self.tick_baseline_ms.lock() {
            *baseline = None;
        }
        self.apply("reset", |engine| {
            engine.reset();
            Ok(Vec::new())
        })
    }

    /// Skip the remainder of the current phase
    pub fn skip(&self) -> Result<StateSnapshot, StateError> {
        info!("Skipping current phase");
        self.apply("skip", |engine| Ok(engine.skip()))
    }

    /// Jump to the next round
    pub fn next_round(&self) -> Result<StateSnapshot, StateError> {
        info!("Jumping to next round");
        self.apply("next-round", |engine| {
            engine.next_round().map(|_| Vec::new())
        })
    }

    /// Jump to the previous round
    pub fn prev_round(&self) -> Result<StateSnapshot, StateError> {
        info!("Jumping to previous round");
        self.apply("prev-round", |engine| {
            engine.prev_round().map(|_| Vec::new())
        })
    }

    /// Get the current engine snapshot
    pub fn snapshot(&self) -> Result<StateSnapshot, StateError> {
        self.engine
            .lock()
            .map(|engine| engine.snapshot())
            .map_err(|_| StateError::Lock("engine"))
    }

    /// Handle a wake of the 1 Hz tick driver
    ///
    /// The baseline arithmetic decides what the wake means: while the engine
    /// is not running the baseline just follows the clock; under one second
    /// of progress nothing happens; ordinary progress consumes one second;
    /// and a gap of `SUSPEND_GAP_MS` or more is treated as a suspension
    /// episode and routed through the tracker and `reconcile`.
    pub fn on_clock_tick(&self, now_ms: u64) -> Result<(), StateError> {
        let mut engine = self.engine.lock().map_err(|_| StateError::Lock("engine"))?;
        let mut baseline = self
            .tick_baseline_ms
            .lock()
            .map_err(|_| StateError::Lock("tick baseline"))?;

        if engine.run_state() != RunState::Running {
            *baseline = None;
            return Ok(());
        }

        let prev = match *baseline {
            Some(prev) => prev,
            None => {
                *baseline = Some(now_ms);
                return Ok(());
            }
        };

        let delta = now_ms.saturating_sub(prev);
        if delta < 1_000 {
            return Ok(());
        }

        let (events, snapshot) = if delta >= SUSPEND_GAP_MS {
            info!("Clock gap of {}ms detected, reconciling", delta);
            let mut tracker = self
                .tracker
                .lock()
                .map_err(|_| StateError::Lock("suspension tracker"))?;
            tracker.on_suspend(prev);
            let elapsed = tracker.on_resume(now_ms);
            drop(tracker);

            let events = engine.reconcile(elapsed);
            *baseline = Some(now_ms);
            (events, engine.snapshot())
        } else {
            // Carry the sub-second remainder so scheduling jitter never
            // gains or loses whole seconds over a run
            let events = engine.tick();
            *baseline = Some(prev + 1_000);
            (events, engine.snapshot())
        };

        drop(baseline);
        drop(engine);

        self.publish(&events, snapshot);
        Ok(())
    }

    /// Record that the host entered a suspended-clock regime
    ///
    /// Ignored unless the engine is running; pausing or idling must never
    /// arm the tracker.
    pub fn on_suspend(&self, now_ms: u64) -> Result<(), StateError> {
        let engine = self.engine.lock().map_err(|_| StateError::Lock("engine"))?;
        if engine.run_state() != RunState::Running {
            debug!("Suspend signal ignored, timer is not running");
            return Ok(());
        }
        drop(engine);

        let mut tracker = self
            .tracker
            .lock()
            .map_err(|_| StateError::Lock("suspension tracker"))?;
        tracker.on_suspend(now_ms);
        info!("Suspension episode recorded at {}ms", now_ms);
        Ok(())
    }

    /// Reconcile the engine after the host left the suspended-clock regime
    ///
    /// A resume with no pending suspend is a no-op.
    pub fn on_resume(&self, now_ms: u64) -> Result<(), StateError> {
        let mut engine = self.engine.lock().map_err(|_| StateError::Lock("engine"))?;
        let mut tracker = self
            .tracker
            .lock()
            .map_err(|_| StateError::Lock("suspension tracker"))?;
        let elapsed = tracker.on_resume(now_ms);
        drop(tracker);

        if elapsed == 0 {
            return Ok(());
        }
        info!("Resumed after {}s of suspension, reconciling", elapsed);

        let events = engine.reconcile(elapsed);
        let snapshot = engine.snapshot();
        drop(engine);

        // Reconciliation resets the tick baseline so the next driver wake
        // starts counting from here
        if let Ok(mut baseline) = self.tick_baseline_ms.lock() {
            if baseline.is_some() {
                *baseline = Some(now_ms);
            }
        }

        self.publish(&events, snapshot);
        Ok(())
    }

    /// Publish a batch of events and the resulting snapshot, in order
    ///
    /// Delivery is fire-and-forget; a sink failure never rolls back engine
    /// state.
    fn publish(&self, events: &[TimerEvent], snapshot: StateSnapshot) {
        for event in events {
            if let Err(e) = self.event_tx.send(*event) {
                warn!("Failed to send timer event: {}", e);
            }
        }
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send snapshot update: {}", e);
        }
    }

    /// Update last action tracking
    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;
    use crate::utils::clock::{testing::ManualClock, Clock};

    fn state(work: u32, rest: u32, rounds: u32) -> AppState {
        AppState::new(
            TimerConfig::new(work, rest, rounds).unwrap(),
            0,
            "127.0.0.1".to_string(),
        )
    }

    fn drain(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn commands_record_last_action() {
        let state = state(30, 10, 2);
        state.start().unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("start"));
        assert!(time.is_some());
    }

    #[test]
    fn rejected_commands_surface_engine_errors() {
        let state = state(30, 10, 2);
        assert!(matches!(state.pause(), Err(StateError::Rejected(_))));
        state.start().unwrap();
        assert!(matches!(state.start(), Err(StateError::Rejected(_))));
    }

    #[test]
    fn clock_ticks_consume_one_second_each() {
        let state = state(30, 10, 2);
        let clock = ManualClock::new(0);
        state.start().unwrap();

        // First wake establishes the baseline
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 30);

        for expected in (27..=29).rev() {
            clock.advance_ms(1_000);
            state.on_clock_tick(clock.now_ms()).unwrap();
            assert_eq!(state.snapshot().unwrap().seconds_remaining, expected);
        }
    }

    #[test]
    fn sub_second_wakes_are_ignored() {
        let state = state(30, 10, 2);
        let clock = ManualClock::new(0);
        state.start().unwrap();
        state.on_clock_tick(clock.now_ms()).unwrap();

        clock.advance_ms(400);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 30);

        // The remainder is carried, not dropped
        clock.advance_ms(600);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 29);
    }

    #[test]
    fn large_gap_is_reconciled_with_events() {
        let state = state(30, 10, 2);
        let clock = ManualClock::new(0);
        let mut rx = state.subscribe_events();
        state.start().unwrap();
        state.on_clock_tick(clock.now_ms()).unwrap();

        // Sleep through the rest of the work phase plus 4s of rest
        clock.advance_ms(34_000);
        state.on_clock_tick(clock.now_ms()).unwrap();

        let snap = state.snapshot().unwrap();
        assert_eq!(snap.phase, Phase::Rest);
        assert_eq!(snap.seconds_remaining, 6);
        assert_eq!(
            drain(&mut rx),
            vec![TimerEvent::PhaseChanged {
                phase: Phase::Rest,
                round: 1
            }]
        );
    }

    #[test]
    fn tick_after_reconcile_does_not_double_count() {
        let state = state(30, 10, 2);
        let clock = ManualClock::new(0);
        state.start().unwrap();
        state.on_clock_tick(clock.now_ms()).unwrap();

        clock.advance_ms(10_000);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 20);

        // A driver wake right after the reconcile must be inert
        clock.advance_ms(100);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 20);
    }

    #[test]
    fn suspend_resume_signals_reconcile_the_gap() {
        let state = state(30, 10, 2);
        let mut rx = state.subscribe_events();
        state.start().unwrap();

        state.on_suspend(1_000).unwrap();
        // Overnight: way past the end of the run
        state.on_resume(10_000_000).unwrap();

        let snap = state.snapshot().unwrap();
        assert_eq!(snap.run, RunState::Completed);
        assert_eq!(snap.seconds_remaining, 30);
        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&TimerEvent::RunCompleted));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == TimerEvent::RunCompleted)
                .count(),
            1
        );
    }

    #[test]
    fn suspend_ignored_unless_running() {
        let state = state(30, 10, 2);
        state.on_suspend(1_000).unwrap();
        // Nothing was armed, so resume is a no-op
        state.on_resume(50_000).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 30);
        assert_eq!(state.snapshot().unwrap().run, RunState::Idle);
    }

    #[test]
    fn resume_without_suspend_is_a_no_op() {
        let state = state(30, 10, 2);
        state.start().unwrap();
        state.on_resume(99_000).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 30);
    }

    #[test]
    fn reset_disarms_pending_suspension() {
        let state = state(30, 10, 2);
        state.start().unwrap();
        state.on_suspend(1_000).unwrap();
        state.reset().unwrap();
        state.start().unwrap();

        // The pre-reset episode must not leak into the new run
        state.on_resume(500_000).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 30);
    }

    #[test]
    fn pausing_stops_the_clock_driver() {
        let state = state(30, 10, 2);
        let clock = ManualClock::new(0);
        state.start().unwrap();
        state.on_clock_tick(clock.now_ms()).unwrap();
        clock.advance_ms(1_000);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 29);

        state.pause().unwrap();
        clock.advance_ms(60_000);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 29);

        // Resuming re-baselines instead of charging the paused minute
        state.resume().unwrap();
        state.on_clock_tick(clock.now_ms()).unwrap();
        clock.advance_ms(1_000);
        state.on_clock_tick(clock.now_ms()).unwrap();
        assert_eq!(state.snapshot().unwrap().seconds_remaining, 28);
    }
}
