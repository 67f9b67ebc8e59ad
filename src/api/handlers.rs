//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};
use crate::state::{AppState, StateError};

/// Turn a command outcome into an HTTP response
///
/// Accepted commands return 200 with the resulting snapshot. Misuse (a
/// command the engine rejects in its current run-state) is 409 with the
/// rejection reason and the untouched snapshot, not a crash. Lock poisoning
/// is the only 500.
fn command_response(
    state: &AppState,
    result: Result<crate::engine::StateSnapshot, StateError>,
    ok_message: &str,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    match result {
        Ok(snapshot) => {
            info!("{}", ok_message);
            Ok((
                StatusCode::OK,
                Json(ApiResponse::ok(ok_message.to_string(), snapshot)),
            ))
        }
        Err(StateError::Rejected(e)) => {
            warn!("Command rejected: {}", e);
            let snapshot = state.snapshot().map_err(|_| {
                error!("Failed to read timer state after rejection");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            Ok((
                StatusCode::CONFLICT,
                Json(ApiResponse::rejected(e.to_string(), snapshot)),
            ))
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /start - Begin the timer run
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.start(), "Timer started")
}

/// Handle POST /pause - Pause a running timer
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.pause(), "Timer paused")
}

/// Handle POST /resume - Resume a paused timer
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.resume(), "Timer resumed")
}

/// Handle POST /reset - Return the timer to its ready state
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.reset(), "Timer reset")
}

/// Handle POST /skip - Skip the remainder of the current phase
pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.skip(), "Phase skipped")
}

/// Handle POST /round/next - Jump to the next round
pub async fn next_round_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.next_round(), "Jumped to next round")
}

/// Handle POST /round/prev - Jump to the previous round
pub async fn prev_round_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    command_response(&state, state.prev_round(), "Jumped to previous round")
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: snapshot,
        config: state.timer_config,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
