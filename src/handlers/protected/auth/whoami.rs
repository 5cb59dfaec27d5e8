// handlers/protected/auth/whoami.rs - GET /api/auth/whoami handler

use axum::extract::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Role;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedTenant, ValidatedUser};
use crate::types::Access;

#[derive(Debug, Serialize)]
pub struct Whoami {
    pub id: Uuid,
    pub name: String,
    pub auth: String,
    pub access: Access,
    pub tenant: String,
    pub tenant_display_name: String,
    pub role: Option<Role>,
    pub scope_id: Option<Uuid>,
    /// `null` when the user sees every scope.
    pub visible_scopes: Option<Vec<Uuid>>,
    pub is_sudo: bool,
    pub expires_in: i64,
}

/// GET /api/auth/whoami - Current user, tenant and token state
pub async fn whoami_get(
    Extension(auth_user): Extension<AuthUser>,
    Extension(ValidatedTenant(tenant)): Extension<ValidatedTenant>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Whoami> {
    Ok(ApiResponse::success(Whoami {
        id: user.id,
        name: user.name,
        auth: user.auth,
        access: user.access,
        tenant: tenant.name,
        tenant_display_name: tenant.display_name,
        role: user.role,
        scope_id: user.scope_id,
        visible_scopes: user.visible_scopes,
        is_sudo: auth_user.is_sudo,
        expires_in: auth_user.claims.expires_in(),
    }))
}
