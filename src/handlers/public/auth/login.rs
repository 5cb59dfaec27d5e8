// handlers/public/auth/login.rs - POST /auth/login/:tenant/:user handler

use axum::{extract::Path, Json};
use serde::Deserialize;

use super::{TokenResponse, TokenUser};
use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::repositories::UserRepo;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{TenantError, TenantService};
use crate::types::Access;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid tenant, user or password")
}

/// POST /auth/login/:tenant/:user - Exchange a password for a session JWT
///
/// Unknown tenants, inactive tenants, unknown users, denied users and wrong
/// passwords all answer with the same 401 so callers cannot probe which part
/// was wrong.
pub async fn login_post(
    Path((tenant_name, auth)): Path<(String, String)>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let service = TenantService::new().await?;
    let tenant = match service.login_tenant(&tenant_name).await {
        Ok(tenant) => tenant,
        Err(TenantError::NotFound(_)) | Err(TenantError::InvalidState(_)) => {
            tracing::warn!(tenant = %tenant_name, user = %auth, "Login rejected: tenant unavailable");
            return Err(invalid_credentials());
        }
        Err(e) => return Err(e.into()),
    };

    let pool = DatabaseManager::tenant_pool(&tenant.database).await?;
    let user = UserRepo::find_by_auth(&pool, &auth).await?.ok_or_else(|| {
        tracing::warn!(tenant = %tenant_name, user = %auth, "Login rejected: unknown user");
        invalid_credentials()
    })?;

    if user.access == Access::Deny || !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(tenant = %tenant_name, user = %auth, "Login rejected: bad password or denied");
        return Err(invalid_credentials());
    }

    let claims = Claims::new(tenant.name.clone(), user.auth.clone(), tenant.database.clone(), user.access, user.id);
    let token = generate_jwt(&claims)?;

    tracing::info!(tenant = %tenant.name, user = %user.auth, access = %user.access, "User logged in");

    Ok(ApiResponse::success(TokenResponse {
        token,
        expires_in: claims.expires_in(),
        user: TokenUser {
            id: user.id,
            name: user.name,
            auth: user.auth,
            tenant: tenant.name,
            access: user.access,
        },
    }))
}
