//! Utility functions module
//!
//! This module contains utility functions used throughout the application.

pub mod clock;
pub mod signals;

// Re-export main functions
pub use clock::{Clock, MonotonicClock};
pub use signals::{lifecycle_signals, shutdown_signal, LifecycleSignal};
