//! Timer tick driver background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::{state::AppState, utils::Clock};

/// Background task that drives the timer engine at 1 Hz
///
/// Each wake reads the monotonic clock and hands the timestamp to the state
/// layer, which decides whether the wake is an ordinary second of progress or
/// a suspension gap that needs reconciliation. Missed ticks are skipped
/// rather than bursted; the baseline arithmetic in the state layer absorbs
/// whatever time actually passed.
pub async fn tick_loop_task(state: Arc<AppState>, clock: Arc<dyn Clock>) {
    info!("Starting timer tick task");

    let mut interval = interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if let Err(e) = state.on_clock_tick(clock.now_ms()) {
            error!("Tick processing failed: {}", e);
        }
    }
}
