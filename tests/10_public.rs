mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn root_lists_endpoints() {
    let (status, body) = common::send(common::get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "OpsDesk API");
    assert!(body["data"]["endpoints"]["assets"].is_string());
}

#[tokio::test]
async fn health_reports_database_state() {
    let (status, body) = common::send(common::get("/health", None)).await;

    // Without a reachable database the service reports itself degraded
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );
    assert!(body["data"]["status"].is_string(), "body: {}", body);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = common::send(common::get("/api/payroll", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn device_provision_validates_before_touching_the_database() {
    let request = common::post_json(
        "/devices/provision",
        None,
        &json!({ "serial_number": "", "provisioning_secret": "abc" }),
    );
    let (status, body) = common::send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["serial_number"].is_string());
}
