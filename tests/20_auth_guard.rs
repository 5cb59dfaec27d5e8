mod common;

use axum::http::StatusCode;
use chrono::Duration;
use opsdesk_api::types::Access;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let (status, body) = common::send(common::get("/api/assets", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let (status, body) = common::send(common::get("/api/auth/whoami", Some("not.a.jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let claims = common::claims(Access::Full, Duration::hours(1));
    let forged = opsdesk_api::auth::encode_jwt(&claims, "some-other-secret").unwrap();
    let (status, _) = common::send(common::get("/api/assets", Some(&forged))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let token = common::token(&common::claims(Access::Full, Duration::hours(-2)));
    let (status, _) = common::send(common::get("/api/assets", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn root_routes_need_an_elevated_session() {
    let token = common::token(&common::claims(Access::Root, Duration::hours(1)));
    let (status, body) = common::send(common::get("/api/root/tenant", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn sudo_flag_without_root_access_is_refused() {
    let mut claims = common::claims(Access::Full, Duration::minutes(10));
    claims.is_sudo = true;
    let token = common::token(&claims);
    let (status, _) = common::send(common::get("/api/root/tenant", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
