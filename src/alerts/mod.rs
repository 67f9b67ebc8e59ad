//! Alert delivery module
//!
//! Phase-boundary events are abstract; this module turns them into concrete
//! alerts and forwards them to a sink. Delivery failures are logged and
//! dropped, never fed back into the engine.

use std::{
    io::{self, Write},
    sync::Arc,
};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    engine::{Phase, TimerEvent},
    state::AppState,
};

/// Audible pattern for an alert
///
/// Phase transitions get a double beep, run completion a single long one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepPattern {
    Double,
    Long,
}

/// A rendered alert ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub pattern: BeepPattern,
    pub title: String,
    pub body: String,
}

impl Alert {
    /// Map a phase-boundary event to its alert
    pub fn from_event(event: &TimerEvent) -> Self {
        match event {
            TimerEvent::PhaseChanged {
                phase: Phase::Work,
                round,
            } => Self {
                pattern: BeepPattern::Double,
                title: "Work Time!".to_string(),
                body: format!("Round {} work phase started", round),
            },
            TimerEvent::PhaseChanged {
                phase: Phase::Rest,
                round,
            } => Self {
                pattern: BeepPattern::Double,
                title: "Rest Time!".to_string(),
                body: format!("Round {} rest phase started", round),
            },
            TimerEvent::RunCompleted => Self {
                pattern: BeepPattern::Long,
                title: "Workout Complete!".to_string(),
                body: "All rounds finished".to_string(),
            },
        }
    }
}

/// Consumer of timer alerts
pub trait AlertSink: Send + Sync {
    /// Deliver a single alert
    fn deliver(&self, alert: &Alert) -> Result<(), String>;
}

/// Sink that rings the terminal bell and logs the alert text
pub struct ConsoleAlertSink {
    audible: bool,
}

impl ConsoleAlertSink {
    /// Create a console sink; `audible = false` keeps the log lines but
    /// silences the bell
    pub fn new(audible: bool) -> Self {
        Self { audible }
    }
}

impl AlertSink for ConsoleAlertSink {
    fn deliver(&self, alert: &Alert) -> Result<(), String> {
        if self.audible {
            let bells: &[u8] = match alert.pattern {
                BeepPattern::Double => b"\x07\x07",
                BeepPattern::Long => b"\x07",
            };
            let mut stdout = io::stdout();
            stdout
                .write_all(bells)
                .and_then(|_| stdout.flush())
                .map_err(|e| format!("Failed to ring terminal bell: {}", e))?;
        }
        info!("{} {}", alert.title, alert.body);
        Ok(())
    }
}

/// Background task that forwards engine events to the alert sink
///
/// A single reconcile may publish a batch of events; they arrive here in
/// order, so the user hears every transition that happened while the host
/// slept, just as they would have live.
pub async fn alert_task(state: Arc<AppState>, sink: Arc<dyn AlertSink>) {
    info!("Starting alert task");

    let mut events = state.subscribe_events();

    loop {
        match events.recv().await {
            Ok(event) => {
                let alert = Alert::from_event(&event);
                if let Err(e) = sink.deliver(&alert) {
                    warn!("Failed to deliver alert: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Alert task lagged, {} alerts dropped", missed);
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Event channel closed, stopping alert task");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_changes_map_to_double_beeps() {
        let work = Alert::from_event(&TimerEvent::PhaseChanged {
            phase: Phase::Work,
            round: 3,
        });
        assert_eq!(work.pattern, BeepPattern::Double);
        assert_eq!(work.title, "Work Time!");
        assert!(work.body.contains("Round 3"));

        let rest = Alert::from_event(&TimerEvent::PhaseChanged {
            phase: Phase::Rest,
            round: 1,
        });
        assert_eq!(rest.pattern, BeepPattern::Double);
        assert_eq!(rest.title, "Rest Time!");
    }

    #[test]
    fn completion_maps_to_long_beep() {
        let alert = Alert::from_event(&TimerEvent::RunCompleted);
        assert_eq!(alert.pattern, BeepPattern::Long);
        assert_eq!(alert.title, "Workout Complete!");
    }
}
