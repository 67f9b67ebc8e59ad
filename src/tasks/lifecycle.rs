//! Suspend/resume lifecycle background task

use std::sync::Arc;

use futures::stream::StreamExt;
use tracing::{info, warn};

use crate::{
    state::AppState,
    utils::{
        signals::{classify_lifecycle_signal, lifecycle_signals},
        Clock, LifecycleSignal,
    },
};

/// Background task that feeds host suspend/resume signals into the timer
///
/// SIGUSR1 arms the suspension tracker, SIGUSR2 drains it and reconciles the
/// gap. Both are safe to deliver at any time: arming is ignored unless the
/// timer is running, and a resume with nothing pending is a no-op.
pub async fn lifecycle_task(state: Arc<AppState>, clock: Arc<dyn Clock>) {
    info!("Starting suspend/resume lifecycle task");

    let mut signals = lifecycle_signals();

    while let Some(signal) = signals.next().await {
        let now_ms = clock.now_ms();
        let result = match classify_lifecycle_signal(signal) {
            Some(LifecycleSignal::Suspend) => {
                info!("Host signalled suspend");
                state.on_suspend(now_ms)
            }
            Some(LifecycleSignal::Resume) => {
                info!("Host signalled resume");
                state.on_resume(now_ms)
            }
            None => continue,
        };

        if let Err(e) = result {
            warn!("Failed to process lifecycle signal: {}", e);
        }
    }
}
