// handlers/public/auth/refresh.rs - POST /auth/refresh/:tenant/:user handler

use axum::{extract::Path, Json};
use serde::Deserialize;

use super::{TokenResponse, TokenUser};
use crate::auth::{generate_jwt, refresh_jwt, Claims};
use crate::database::manager::DatabaseManager;
use crate::database::repositories::UserRepo;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{TenantError, TenantService};
use crate::types::Access;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /auth/refresh/:tenant/:user - Renew a session token
///
/// The presented token may already be expired but must still be inside the
/// refresh window. The user is re-read so a changed access level or a
/// deleted account is picked up here rather than carried forward.
pub async fn refresh_post(
    Path((tenant_name, auth)): Path<(String, String)>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let old = refresh_jwt(&payload.token)?;
    if old.tenant != tenant_name || old.user != auth {
        tracing::warn!(tenant = %tenant_name, user = %auth, "Refresh rejected: token identity mismatch");
        return Err(ApiError::unauthorized("Token does not belong to this tenant and user"));
    }

    let tenant = match TenantService::new().await?.login_tenant(&tenant_name).await {
        Ok(tenant) => tenant,
        Err(TenantError::NotFound(_)) | Err(TenantError::InvalidState(_)) => {
            return Err(ApiError::unauthorized("Tenant is not active"));
        }
        Err(e) => return Err(e.into()),
    };

    let pool = DatabaseManager::tenant_pool(&tenant.database).await?;
    let user = UserRepo::find_by_id(&pool, old.user_id)
        .await?
        .filter(|user| user.auth == auth && user.access != Access::Deny)
        .ok_or_else(|| ApiError::unauthorized("User is no longer active"))?;

    let claims = Claims::new(tenant.name.clone(), user.auth.clone(), tenant.database.clone(), user.access, user.id);
    let token = generate_jwt(&claims)?;

    tracing::info!(tenant = %tenant.name, user = %user.auth, "Token refreshed");

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
