//! Interval Bell - A state-managed HTTP server for interval-training timers
//!
//! This is the main entry point for the interval-bell application.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use interval_bell::{
    alerts::{alert_task, ConsoleAlertSink},
    api::create_router,
    config::Config,
    state::AppState,
    tasks::{lifecycle_task, tick_loop_task},
    utils::{shutdown_signal, Clock, MonotonicClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "interval_bell={},tower_http=info",
            config.log_level()
        ))
        .init();

    info!("Starting interval-bell server v1.0.0");
    info!(
        "Configuration: host={}, port={}, work={}s, rest={}s, rounds={}",
        config.host, config.port, config.work, config.rest, config.rounds
    );

    // Validate timer durations before anything is built on them
    let timer_config = config
        .timer_config()
        .context("Invalid timer configuration")?;

    // Create application state and the wall-clock source
    let state = Arc::new(AppState::new(timer_config, config.port, config.host.clone()));
    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());

    // Start the 1 Hz tick driver
    let tick_state = Arc::clone(&state);
    let tick_clock = Arc::clone(&clock);
    tokio::spawn(async move {
        tick_loop_task(tick_state, tick_clock).await;
    });

    // Start the suspend/resume lifecycle listener
    let lifecycle_state = Arc::clone(&state);
    let lifecycle_clock = Arc::clone(&clock);
    tokio::spawn(async move {
        lifecycle_task(lifecycle_state, lifecycle_clock).await;
    });

    // Start the alert sink consumer
    let alert_state = Arc::clone(&state);
    let sink = Arc::new(ConsoleAlertSink::new(!config.silent));
    tokio::spawn(async move {
        alert_task(alert_state, sink).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start      - Start the timer");
    info!("  POST /pause      - Pause the timer");
    info!("  POST /resume     - Resume the timer");
    info!("  POST /reset      - Reset to the ready state");
    info!("  POST /skip       - Skip the current phase");
    info!("  POST /round/next - Jump to the next round");
    info!("  POST /round/prev - Jump to the previous round");
    info!("  GET  /status     - Check timer status");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
