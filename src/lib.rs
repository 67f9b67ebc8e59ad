//! Interval Bell - A state-managed HTTP server for interval-training timers
//!
//! This library provides an interval timer that alternates work and rest
//! phases across a configured number of rounds, keeps correct time across
//! host suspension gaps, and emits alert events at every phase boundary.

pub mod alerts;
pub mod api;
pub mod config;
pub mod engine;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{PhaseTimerEngine, SuspensionTracker, TimerConfig};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
