use crate::dto::{GroupedLogParams, GroupedLogRow};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use kestrel_dns_domain::OutcomeFilter;
use tracing::instrument;

const DEFAULT_LIMIT: usize = 50;

/// Grouped query log: one row per `(domain, type)`, hottest first.
#[instrument(skip(state), name = "api_get_grouped_log")]
pub async fn get_grouped_log(
    State(state): State<AppState>,
    Query(params): Query<GroupedLogParams>,
) -> Result<Json<Vec<GroupedLogRow>>, (StatusCode, String)> {
    let filter = match params.filter.as_deref() {
        None => OutcomeFilter::All,
        Some(raw) => raw.parse().map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("unknown filter '{}'", raw),
            )
        })?,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let rows = state
        .service
        .grouped_log(filter, limit)
        .into_iter()
        .map(GroupedLogRow::from)
        .collect();

    Ok(Json(rows))
}
