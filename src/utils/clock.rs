//! Monotonic wall-clock source

use std::time::Instant;

/// Monotonic millisecond clock supplied to the timer host
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin; never goes backwards
    fn now_ms(&self) -> u64;
}

/// Production clock anchored at process start
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock with its origin at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::Clock;

    /// Hand-driven clock for tests; no real time passes
    #[derive(Debug, Default)]
    pub struct ManualClock {
        now_ms: AtomicU64,
    }

    impl ManualClock {
        pub fn new(start_ms: u64) -> Self {
            Self {
                now_ms: AtomicU64::new(start_ms),
            }
        }

        pub fn advance_ms(&self, delta: u64) {
            self.now_ms.fetch_add(delta, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }
}
