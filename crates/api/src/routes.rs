use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates all API routes with state
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::get_status))
        .route("/config", get(handlers::get_config))
        .route("/config", post(handlers::update_config))
        .route("/action/{action}", post(handlers::run_action))
        .route("/lookup", get(handlers::lookup))
        .route("/log/grouped", get(handlers::get_grouped_log))
        .with_state(state)
}
