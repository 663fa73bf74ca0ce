//! Control surface end to end: HTTP actions and lookups against a live
//! resolver backed by a mock upstream.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use kestrel_dns_api::{create_api_routes, AppState};
use kestrel_dns_infrastructure::dns::ResolverService;
use serde_json::Value;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tower::ServiceExt;

#[path = "../common/mod.rs"]
mod common;
use common::{config_for, MockBehavior, MockUpstream};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(app: &axum::Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &axum::Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_lookup_and_grouped_log_through_api() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 20),
        ttl: 180,
    })
    .await
    .unwrap();

    let service = Arc::new(ResolverService::new(config_for(&upstream)));
    service.start().await.unwrap();
    let app = create_api_routes(AppState::new(service.clone()));

    let response = get(&app, "/lookup?domain=api.test&type=A").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["domain"], "api.test.");
    assert_eq!(json["type"], "A");
    assert_eq!(json["result"][0], "203.0.113.20");

    // Second lookup hits the cache; the server field says so.
    let response = get(&app, "/lookup?domain=api.test&type=A").await;
    let json = body_json(response).await;
    assert_eq!(json["server"], "cache");

    // Operator lookups are counted in the grouped rows.
    let response = get(&app, "/log/grouped").await;
    let rows = body_json(response).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["domain"], "api.test.");
    assert_eq!(rows[0]["hits"], 2);
    assert_eq!(rows[0]["cache_hits"], 1);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_flush_action_resets_cache_not_totals() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 21),
        ttl: 180,
    })
    .await
    .unwrap();

    let service = Arc::new(ResolverService::new(config_for(&upstream)));
    service.start().await.unwrap();
    let app = create_api_routes(AppState::new(service.clone()));

    get(&app, "/lookup?domain=flush.test&type=A").await;
    get(&app, "/lookup?domain=flush.test&type=A").await;

    let response = post(&app, "/action/flush").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app, "/status").await).await;
    assert_eq!(json["cache"]["size"], 0);
    assert_eq!(json["cache"]["hits"], 0);
    assert_eq!(json["total_queries"], 2);

    // Cold cache again: the next lookup goes upstream.
    get(&app, "/lookup?domain=flush.test&type=A").await;
    assert_eq!(upstream.queries_seen(), 2);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_restart_action_preserves_counters() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 22),
        ttl: 180,
    })
    .await
    .unwrap();

    let service = Arc::new(ResolverService::new(config_for(&upstream)));
    service.start().await.unwrap();
    let app = create_api_routes(AppState::new(service.clone()));

    get(&app, "/lookup?domain=restart.test&type=A").await;

    let response = post(&app, "/action/restart").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&app, "/status").await).await;
    assert_eq!(json["service"], "active");
    assert_eq!(json["total_queries"], 1);
    assert_eq!(json["cache"]["size"], 0);

    service.stop().await.unwrap();
}

#[tokio::test]
async fn test_config_replacement_restarts_running_service() {
    let upstream = MockUpstream::start(MockBehavior::Answer {
        ip: Ipv4Addr::new(203, 0, 113, 23),
        ttl: 180,
    })
    .await
    .unwrap();

    let service = Arc::new(ResolverService::new(config_for(&upstream)));
    service.start().await.unwrap();
    let app = create_api_routes(AppState::new(service.clone()));

    let mut config = body_json(get(&app, "/config").await).await;
    config["resolver"]["cache_size"] = Value::from(512);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/config")
                .header("content-type", "application/json")
                .body(Body::from(config.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Still running, on the new settings.
    let json = body_json(get(&app, "/status").await).await;
    assert_eq!(json["service"], "active");
    assert_eq!(json["cache"]["maxsize"], 512);

    service.stop().await.unwrap();
}
