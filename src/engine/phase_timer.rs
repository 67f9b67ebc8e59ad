//! Phase timer state machine
//!
//! The engine owns {phase, round, seconds remaining, run-state} and advances
//! it one second per `tick`, or many seconds at once through `reconcile` after
//! a suspension gap. All transitions are synchronous and side-effect free; the
//! caller receives the phase-boundary events and forwards them to alert sinks.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for rejected operations and invalid timer configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested operation is not legal in the current run-state
    #[error("cannot {op} while {state}")]
    InvalidTransition { op: &'static str, state: RunState },
    /// Work and rest durations must be at least one second each
    #[error("work and rest durations must be at least one second")]
    ZeroDuration,
    /// At least one round is required
    #[error("round count must be at least one")]
    ZeroRounds,
    /// A round jump would leave the configured round range
    #[error("round {requested} is out of range 1..={rounds}")]
    RoundOutOfRange { requested: u32, rounds: u32 },
}

/// The current activity segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Rest,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Work => write!(f, "work"),
            Phase::Rest => write!(f, "rest"),
        }
    }
}

/// Run-state of the timer, orthogonal to the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Paused => write!(f, "paused"),
            RunState::Completed => write!(f, "completed"),
        }
    }
}

/// Immutable per-run timer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
}

impl TimerConfig {
    /// Validate and build a timer configuration
    pub fn new(work_seconds: u32, rest_seconds: u32, rounds: u32) -> Result<Self, EngineError> {
        if work_seconds == 0 || rest_seconds == 0 {
            return Err(EngineError::ZeroDuration);
        }
        if rounds == 0 {
            return Err(EngineError::ZeroRounds);
        }
        Ok(Self {
            work_seconds,
            rest_seconds,
            rounds,
        })
    }
}

/// Phase-boundary events emitted by the engine
///
/// Mid-phase ticks emit nothing; each phase transition emits exactly one
/// event. A single `reconcile` call may emit a batch of these in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A new phase began in the given round
    PhaseChanged { phase: Phase, round: u32 },
    /// The final round's rest phase finished
    RunCompleted,
}

/// Point-in-time view of the engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub phase: Phase,
    pub round: u32,
    pub seconds_remaining: u32,
    pub run: RunState,
}

/// Interval timer state machine
///
/// Created in the ready snapshot (`round=1`, work phase, full work duration,
/// idle) and mutated only through its own operations.
#[derive(Debug, Clone)]
pub struct PhaseTimerEngine {
    config: TimerConfig,
    phase: Phase,
    round: u32,
    seconds_remaining: u32,
    run: RunState,
}

impl PhaseTimerEngine {
    /// Create a new engine in the idle ready snapshot
    pub fn new(config: TimerConfig) -> Self {
        Self {
            config,
            phase: Phase::Work,
            round: 1,
            seconds_remaining: config.work_seconds,
            run: RunState::Idle,
        }
    }

    /// Get the timer configuration
    pub fn config(&self) -> TimerConfig {
        self.config
    }

    /// Get a snapshot of the current state
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.phase,
            round: self.round,
            seconds_remaining: self.seconds_remaining,
            run: self.run,
        }
    }

    /// Current run-state
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// Begin consuming time; valid from idle or from the post-completion
    /// ready snapshot
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.run {
            RunState::Idle | RunState::Completed => {
                self.run = RunState::Running;
                Ok(())
            }
            state => Err(EngineError::InvalidTransition { op: "start", state }),
        }
    }

    /// Stop consuming time without touching phase, round, or remaining time
    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.run {
            RunState::Running => {
                self.run = RunState::Paused;
                Ok(())
            }
            state => Err(EngineError::InvalidTransition { op: "pause", state }),
        }
    }

    /// Resume consuming time after a pause
    pub fn resume(&mut self) -> Result<(), EngineError> {
        match self.run {
            RunState::Paused => {
                self.run = RunState::Running;
                Ok(())
            }
            state => Err(EngineError::InvalidTransition { op: "resume", state }),
        }
    }

    /// Return to the idle ready snapshot; valid from any state
    pub fn reset(&mut self) {
        self.phase = Phase::Work;
        self.round = 1;
        self.seconds_remaining = self.config.work_seconds;
        self.run = RunState::Idle;
    }

    /// Force immediate completion of the current phase
    ///
    /// Fires the same events as the phase reaching zero naturally. No-op once
    /// the run is completed.
    pub fn skip(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.run != RunState::Completed {
            self.complete_phase(&mut events);
        }
        events
    }

    /// Consume one second of the current phase
    ///
    /// Only consumes time while running; a stray tick in any other run-state
    /// is ignored so tick delivery racing a pause or a reconcile cannot
    /// corrupt state.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.run != RunState::Running {
            return events;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.complete_phase(&mut events);
        }
        events
    }

    /// Fast-forward through a suspension gap of whole seconds
    ///
    /// Equivalent to calling `tick` that many times, but computed per phase:
    /// the loop runs once per phase transition skipped, not once per elapsed
    /// second, so an overnight gap costs the same as a short one. Surplus
    /// time past the end of the run is discarded after the single
    /// `RunCompleted`.
    pub fn reconcile(&mut self, elapsed_seconds: u64) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.run != RunState::Running || elapsed_seconds == 0 {
            return events;
        }
        let mut left = elapsed_seconds;
        loop {
            if left < u64::from(self.seconds_remaining) {
                self.seconds_remaining -= left as u32;
                break;
            }
            left -= u64::from(self.seconds_remaining);
            self.complete_phase(&mut events);
            if self.run == RunState::Completed {
                break;
            }
        }
        events
    }

    /// Jump to the top of the next round's work phase
    pub fn next_round(&mut self) -> Result<(), EngineError> {
        if self.run == RunState::Completed {
            return Err(EngineError::InvalidTransition {
                op: "jump rounds",
                state: self.run,
            });
        }
        if self.round >= self.config.rounds {
            return Err(EngineError::RoundOutOfRange {
                requested: self.round + 1,
                rounds: self.config.rounds,
            });
        }
        self.round += 1;
        self.land_at_round_start();
        Ok(())
    }

    /// Jump back to the top of the previous round's work phase
    pub fn prev_round(&mut self) -> Result<(), EngineError> {
        if self.run == RunState::Completed {
            return Err(EngineError::InvalidTransition {
                op: "jump rounds",
                state: self.run,
            });
        }
        if self.round <= 1 {
            return Err(EngineError::RoundOutOfRange {
                requested: 0,
                rounds: self.config.rounds,
            });
        }
        self.round -= 1;
        self.land_at_round_start();
        Ok(())
    }

    /// A manual round jump lands paused at a full work phase; time must not
    /// keep flowing across the jump
    fn land_at_round_start(&mut self) {
        self.phase = Phase::Work;
        self.seconds_remaining = self.config.work_seconds;
        if self.run == RunState::Running {
            self.run = RunState::Paused;
        }
    }

    /// Shared phase-completion logic for tick-zero, skip, and reconcile
    fn complete_phase(&mut self, events: &mut Vec<TimerEvent>) {
        match self.phase {
            Phase::Work => {
                self.phase = Phase::Rest;
                self.seconds_remaining = self.config.rest_seconds;
                events.push(TimerEvent::PhaseChanged {
                    phase: Phase::Rest,
                    round: self.round,
                });
            }
            Phase::Rest if self.round < self.config.rounds => {
                self.round += 1;
                self.phase = Phase::Work;
                self.seconds_remaining = self.config.work_seconds;
                events.push(TimerEvent::PhaseChanged {
                    phase: Phase::Work,
                    round: self.round,
                });
            }
            Phase::Rest => {
                // Final rest just finished: complete and restore the ready
                // snapshot for the next run
                self.run = RunState::Completed;
                self.phase = Phase::Work;
                self.round = 1;
                self.seconds_remaining = self.config.work_seconds;
                events.push(TimerEvent::RunCompleted);
            }
        }
    }
}
