use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kestrel_dns_api::{create_api_routes, AppState};
use kestrel_dns_domain::{Config, UpstreamTarget};
use kestrel_dns_infrastructure::dns::ResolverService;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn test_state() -> AppState {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1".to_string();
    config.server.dns_port = 0;
    config.resolver.upstreams = vec![UpstreamTarget::new("192.0.2.1", 53, "dead", false)];
    config.resolver.timeout = 0.05;
    AppState::new(Arc::new(ResolverService::new(config)))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_returns_ok() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_status_reports_inactive_before_start() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["running"], false);
    assert_eq!(json["service"], "inactive");
    assert_eq!(json["total_queries"], 0);
    assert!(json["listen"].is_null());

    let upstreams = json["config"]["upstreams"].as_array().unwrap();
    assert_eq!(upstreams.len(), 1);
    assert_eq!(upstreams[0]["host"], "192.0.2.1");
    assert_eq!(upstreams[0]["port"], 53);
    assert_eq!(upstreams[0]["name"], "dead");
    assert_eq!(upstreams[0]["dot"], false);
}

#[tokio::test]
async fn test_start_action_brings_service_up() {
    let state = test_state();
    let app = create_api_routes(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/action/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["service"], "active");

    state.service.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_when_stopped_conflicts() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/action/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_unknown_action_is_not_found() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/action/reboot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lookup_rejects_unknown_record_type() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/lookup?domain=example.com&type=LOC")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lookup_on_stopped_service_reports_error_in_payload() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/lookup?domain=example.com&type=A")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["server"].is_null());
    assert!(json["result"][0]
        .as_str()
        .unwrap()
        .contains("not running"));
}

#[tokio::test]
async fn test_grouped_log_defaults_to_empty() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/log/grouped")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_grouped_log_rejects_bad_filter() {
    let app = create_api_routes(test_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/log/grouped?filter=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_round_trip_and_rejection() {
    let state = test_state();
    let app = create_api_routes(state.clone());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/config").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let current = body_json(response).await;
    assert_eq!(current["resolver"]["upstreams"].as_array().unwrap().len(), 1);

    // Empty upstream list fails validation and must not replace anything.
    let mut bad = current.clone();
    bad["resolver"]["upstreams"] = Value::Array(vec![]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header("content-type", "application/json")
                .body(Body::from(bad.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let kept = state.service.current_config().await;
    assert_eq!(kept.resolver.upstreams.len(), 1);
}
