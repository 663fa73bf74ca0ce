use crate::dto::StatusResponse;
use crate::state::AppState;
use axum::{extract::State, Json};
use tracing::{debug, instrument};

#[instrument(skip(state), name = "api_get_status")]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let snapshot = state.service.status().await;
    debug!(
        state = snapshot.state.as_str(),
        total_queries = snapshot.stats.total_queries,
        "Status snapshot served"
    );
    Json(snapshot.into())
}
