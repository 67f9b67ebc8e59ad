//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod lifecycle;
pub mod tick_loop;

// Re-export main functions
pub use lifecycle::lifecycle_task;
pub use tick_loop::tick_loop_task;
