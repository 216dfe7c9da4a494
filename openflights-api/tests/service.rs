use openflights_telemetry::tracing::init_test_tracing;
use serde_json::Value;

mod support;

use crate::support::test_app::spawn_test_app;

#[tokio::test(flavor = "multi_thread")]
async fn health_check_works() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app.health_check().await;

    // Assert
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test(flavor = "multi_thread")]
async fn caller_request_id_is_echoed() {
    let app = spawn_test_app().await;

    let response = app
        .api_client
        .get(format!("{}/health_check", &app.address))
        .header("x-request-id", "trace-me-123")
        .send()
        .await
        .expect("failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "trace-me-123");
}

#[tokio::test(flavor = "multi_thread")]
async fn metrics_endpoint_works() {
    init_test_tracing();
    let app = spawn_test_app().await;

    let response = app.metrics().await;

    assert!(response.status().is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn openapi_document_lists_every_route() {
    let app = spawn_test_app().await;

    let response = app.openapi().await;

    assert!(response.status().is_success());
    let document: Value = response
        .json()
        .await
        .expect("failed to deserialize response");
    let paths = document["paths"].as_object().unwrap();
    for path in [
        "/airports",
        "/airports/missing-codes",
        "/airports/{airport_id}",
        "/airlines",
        "/countries",
        "/countries/{country_id}/city-airport-counts",
    ] {
        assert!(paths.contains_key(path), "missing path {path}");
    }
    assert!(document["paths"]["/airports/{airport_id}"]["patch"].is_object());
    assert_eq!(document["paths"]["/airports"]["get"]["summary"], "List airports");
}
