use crate::dto::ActionResponse;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use kestrel_dns_domain::{Config, DomainError};
use tracing::{info, instrument, warn};

#[instrument(skip(state), name = "api_get_config")]
pub async fn get_config(State(state): State<AppState>) -> Json<Config> {
    Json(state.service.current_config().await)
}

/// Replace the configuration.
///
/// Validation runs before anything changes; a rejected config leaves the
/// previous one active and returns 400. Accepting it restarts a running
/// resolver so the new settings take effect.
#[instrument(skip(state, new_config), name = "api_update_config")]
pub async fn update_config(
    State(state): State<AppState>,
    Json(new_config): Json<Config>,
) -> (StatusCode, Json<ActionResponse>) {
    match state.service.update_config(new_config).await {
        Ok(()) => {
            info!("Configuration updated");
            (
                StatusCode::OK,
                Json(ActionResponse::ok("configuration updated")),
            )
        }
        Err(e) => {
            warn!(error = %e, "Configuration update failed");
            let code = match e {
                DomainError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(ActionResponse::failed(e.to_string())))
        }
    }
}
