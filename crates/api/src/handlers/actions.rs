use crate::dto::ActionResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};

/// Lifecycle and maintenance actions for the dashboard.
#[instrument(skip(state), name = "api_run_action")]
pub async fn run_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> (StatusCode, Json<ActionResponse>) {
    let result = match action.as_str() {
        "start" => state.service.start().await.map(|()| "service started"),
        "stop" => state.service.stop().await.map(|()| "service stopped"),
        "restart" => state.service.restart().await.map(|()| "service restarted"),
        "flush" => state.service.flush().await.map(|()| "cache flushed"),
        other => {
            warn!(action = other, "Unknown action");
            return (
                StatusCode::NOT_FOUND,
                Json(ActionResponse::failed(format!("unknown action '{}'", other))),
            );
        }
    };

    match result {
        Ok(message) => {
            info!(action = %action, "Action completed");
            (StatusCode::OK, Json(ActionResponse::ok(message)))
        }
        Err(e) => {
            warn!(action = %action, error = %e, "Action failed");
            (
                StatusCode::CONFLICT,
                Json(ActionResponse::failed(e.to_string())),
            )
        }
    }
}
