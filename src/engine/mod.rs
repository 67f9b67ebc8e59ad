//! Timer engine module
//!
//! This module contains the phase timer state machine and the suspension
//! tracking used to reconcile time across clock gaps.

pub mod phase_timer;
pub mod suspension;

// Re-export main types
pub use phase_timer::{
    EngineError, Phase, PhaseTimerEngine, RunState, StateSnapshot, TimerConfig, TimerEvent,
};
pub use suspension::SuspensionTracker;
