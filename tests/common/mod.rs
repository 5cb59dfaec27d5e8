#![allow(dead_code)]

use std::sync::Once;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use opsdesk_api::auth::{encode_jwt, Claims};
use opsdesk_api::types::Access;

pub const TEST_SECRET: &str = "integration-test-secret";

static ENV: Once = Once::new();

/// Router with a known JWT secret. Must run before anything reads the config.
pub fn app() -> Router {
    ENV.call_once(|| {
        std::env::set_var("JWT_SECRET", TEST_SECRET);
        std::env::set_var("APP_ENV", "development");
    });
    opsdesk_api::routes::app()
}

pub async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn claims(access: Access, lifetime: chrono::Duration) -> Claims {
    Claims::with_lifetime(
        "acme".to_string(),
        "ada".to_string(),
        "tenant_0123456789abcdef".to_string(),
        access,
        Uuid::new_v4(),
        lifetime,
    )
}

pub fn token(claims: &Claims) -> String {
    encode_jwt(claims, TEST_SECRET).expect("encode")
}
