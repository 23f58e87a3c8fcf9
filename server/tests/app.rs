//! Application assembly tests.

#![allow(clippy::unwrap_used)]

use actions_server::{app, exporter::METRICS_PATH};
use actions_testing::{
    InMemoryActionStore, InMemoryAncestors, RecordingNotificationBus, test_clock,
};
use actions_web::AppState;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower::ServiceExt;

fn state() -> AppState {
    AppState::new(
        Arc::new(InMemoryActionStore::new()),
        Arc::new(InMemoryAncestors::new()),
        Arc::new(RecordingNotificationBus::new()),
        Arc::new(test_clock()),
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn metrics_route_is_mounted_when_enabled() {
    let handle = PrometheusBuilder::new().build_recorder().handle();

    let response = app(state(), Some(handle)).oneshot(get(METRICS_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_route_is_absent_when_disabled() {
    let response = app(state(), None).oneshot(get(METRICS_PATH)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_routes_are_served() {
    let response = app(state(), None).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
