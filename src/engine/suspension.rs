//! Suspension episode tracking
//!
//! Records when the engine entered a suspended-clock regime and, on resume,
//! turns the wall-clock gap into the whole-second count fed to `reconcile`.

use tracing::debug;

/// Tracks at most one outstanding suspension episode
///
/// The caller arms the tracker only while the engine is running; pausing or
/// idling must never arm it. A second suspend while one is pending silently
/// takes the later timestamp.
#[derive(Debug, Clone, Default)]
pub struct SuspensionTracker {
    suspended_at_ms: Option<u64>,
}

impl SuspensionTracker {
    /// Create an unarmed tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timestamp at which ticking stopped
    pub fn on_suspend(&mut self, now_ms: u64) {
        if self.suspended_at_ms.is_some() {
            debug!("suspend recorded while one was pending, keeping the later timestamp");
        }
        self.suspended_at_ms = Some(now_ms);
    }

    /// Consume the pending episode and return the elapsed whole seconds
    ///
    /// Returns 0 when unarmed. Fractional seconds are floored, never rounded
    /// up, and clock regressions clamp to 0.
    pub fn on_resume(&mut self, now_ms: u64) -> u64 {
        match self.suspended_at_ms.take() {
            Some(suspended_at) => now_ms.saturating_sub(suspended_at) / 1000,
            None => 0,
        }
    }

    /// Drop any pending episode; called when the timer stops
    pub fn clear(&mut self) {
        self.suspended_at_ms = None;
    }

    /// Whether a suspension episode is currently pending
    pub fn is_armed(&self) -> bool {
        self.suspended_at_ms.is_some()
    }
}
