// handlers/protected/auth/sudo.rs - POST /api/auth/sudo handler

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::generate_jwt;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedUser};
use crate::types::Access;

#[derive(Debug, Default, Deserialize)]
pub struct SudoRequest {
    /// Free text recorded in the audit log.
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SudoResponse {
    pub token: String,
    pub expires_in: i64,
    pub is_sudo: bool,
}

/// POST /api/auth/sudo - Short-lived token for /api/root/*
///
/// Only `root` users may elevate. The elevated token carries the same
/// identity with `is_sudo` set and the sudo expiry from configuration.
pub async fn sudo_post(
    Extension(auth_user): Extension<AuthUser>,
    Extension(user): Extension<ValidatedUser>,
    payload: Option<Json<SudoRequest>>,
) -> ApiResult<SudoResponse> {
    if user.access != Access::Root {
        tracing::warn!(user = %user.auth, tenant = %auth_user.tenant, access = %user.access, "Sudo refused");
        return Err(ApiError::forbidden("Sudo requires root access"));
    }

    let Json(request) = payload.unwrap_or_default();
    let claims = auth_user.claims.elevate();
    let token = generate_jwt(&claims)?;

    tracing::info!(
        user = %user.auth,
        tenant = %auth_user.tenant,
        reason = request.reason.as_deref().unwrap_or(""),
        "Sudo granted"
    );

    Ok(ApiResponse::success(SudoResponse {
        token,
        expires_in: claims.expires_in(),
        is_sudo: true,
    }))
}
