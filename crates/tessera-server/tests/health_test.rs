//! Health, repository status and metrics endpoints.

mod helpers;

use axum::http::StatusCode;
use helpers::{REPO_FILES, assert_error_envelope, client, unstarted};
use serde_json::Value;

#[tokio::test]
async fn health_is_up_when_ready() {
    let server = client().await;

    let response = server.get("/health").await;
    response
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("application/json");

    let json: Value = response.json();
    assert_eq!(json["status"], "UP");
    assert_eq!(json["ready"], true);
    assert_eq!(json["branch"], "main");
    assert_eq!(
        json["version"].as_str(),
        server.synchronizer.current_version().as_deref()
    );
}

#[tokio::test]
async fn health_is_down_before_first_sync() {
    let server = unstarted(REPO_FILES);

    let response = server.client.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = response.json();
    assert_eq!(json["status"], "DOWN");
    assert_eq!(json["ready"], false);
    assert!(json["version"].is_null());
}

#[tokio::test]
async fn repository_status_reports_sync() {
    let server = client().await;

    let json: Value = server.get("/actuator/repository").await.json();

    assert_eq!(json["ready"], true);
    assert_eq!(json["branch"], "main");
    assert_eq!(json["consecutiveFailures"], 0);
    assert!(json["lastSync"].is_string());
    assert!(json["lastError"].is_null());
}

#[tokio::test]
async fn metrics_endpoint_answers() {
    let server = client().await;

    server.get("/metrics").await.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_gets_envelope() {
    let server = client().await;

    let response = server.get("/a/b/c/d").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_envelope(&response.json(), 404, "/a/b/c/d");
}
