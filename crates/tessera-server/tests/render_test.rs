//! Merged documents: `/{label}/{application}-{profile}.{ext}` and
//! `/{application}-{profile}.{ext}`.

mod helpers;

use axum::http::StatusCode;
use helpers::{assert_error_envelope, assert_valid_properties, assert_valid_yaml, client};
use serde_json::Value;

#[tokio::test]
async fn yaml_document_merges_by_precedence() {
    let server = client().await;

    let response = server.get("/main/service-x-dev.yml").await;
    response
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("text/yaml");

    let text = response.text();
    assert_valid_yaml(&text);
    let doc: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(doc["a"], serde_yaml::Value::from(10));
    assert_eq!(doc["b"], serde_yaml::Value::from(2));
    assert_eq!(doc["c"], serde_yaml::Value::from(30));
    assert_eq!(doc["server"]["port"], serde_yaml::Value::from(8080));
}

#[tokio::test]
async fn yaml_extension_alias() {
    let server = client().await;

    let yml = server.get("/main/service-x-dev.yml").await;
    let yaml = server.get("/main/service-x-dev.yaml").await;

    assert_eq!(yml.body, yaml.body);
}

#[tokio::test]
async fn properties_document() {
    let server = client().await;

    let response = server.get("/main/service-x-dev.properties").await;
    response
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("text/plain");

    let text = response.text();
    assert_valid_properties(&text);
    assert!(text.contains("a=10\n"), "{text}");
    assert!(text.contains("c=30\n"), "{text}");
    assert!(text.contains("server.port=8080\n"), "{text}");
}

#[tokio::test]
async fn json_document_applies_secrets() {
    let server = client().await;

    let response = server.get("/main/service-x-dev.json").await;
    response
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("application/json");

    let json: Value = response.json();
    assert_eq!(json["a"], 10);
    assert_eq!(json["db"]["password"], "s3cret");
}

#[tokio::test]
async fn unlabelled_document_uses_branch() {
    let server = client().await;

    let labelled = server.get("/main/service-x-dev.json").await;
    let unlabelled = server.get("/service-x-dev.json").await;

    unlabelled.assert_status(StatusCode::OK);
    assert_eq!(labelled.body, unlabelled.body);
}

#[tokio::test]
async fn name_without_dash_uses_default_profile() {
    let server = client().await;

    let json: Value = server.get("/application.json").await.json();

    assert_eq!(json["a"], 1);
    assert!(json.get("b").is_none());
}

#[tokio::test]
async fn name_without_extension_is_not_found() {
    let server = client().await;

    let response = server.get("/service-x").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_error_envelope(&response.json(), 404, "/service-x");
}

#[tokio::test]
async fn invalid_label_on_document_is_rejected() {
    let server = client().await;

    server
        .get("/a..b/service-x-dev.yml")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
