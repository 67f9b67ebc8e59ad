//! State management module
//!
//! This module contains the shared application state that wraps the timer
//! engine for the HTTP host and the background tasks.

pub mod app_state;

// Re-export main types
pub use app_state::{AppState, StateError, SUSPEND_GAP_MS};
