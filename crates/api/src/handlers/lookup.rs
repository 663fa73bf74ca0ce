use crate::dto::{LookupParams, LookupResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use kestrel_dns_domain::RecordType;
use tracing::{debug, instrument};

/// Ad-hoc lookup through the running resolver.
///
/// Resolution failures are part of the payload (`result` carries the
/// error message), not an HTTP error; only an unparseable record type is
/// a 400.
#[instrument(skip(state), name = "api_lookup")]
pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupResponse>, (StatusCode, String)> {
    let record_type: RecordType = params.record_type.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("unsupported record type '{}'", params.record_type),
        )
    })?;

    let response = match state.service.lookup(&params.domain, record_type).await {
        Ok(outcome) => LookupResponse {
            domain: outcome.domain.to_string(),
            record_type: outcome.record_type.as_str().to_string(),
            server: Some(outcome.server),
            result: outcome.answers,
        },
        Err(e) => {
            debug!(domain = %params.domain, error = %e, "Lookup failed");
            LookupResponse {
                domain: params.domain,
                record_type: record_type.as_str().to_string(),
                server: None,
                result: vec![e.to_string()],
            }
        }
    };

    Ok(Json(response))
}
