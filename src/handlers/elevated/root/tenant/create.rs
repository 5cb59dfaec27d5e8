// handlers/elevated/root/tenant/create.rs - POST /api/root/tenant handler

use axum::{extract::Extension, Json};
use validator::Validate;

use crate::database::models::{CreateTenant, Tenant};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::tenant_service::TenantService;

/**
 * POST /api/root/tenant - Onboard a new tenant
 *
 * Clones the template database, runs the tenant migrations, seeds the first
 * administrator and registers the tenant as `pending_payment`. The tenant
 * cannot log in until its first payment is confirmed.
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "acme",
 *   "display_name": "Acme Ltd",
 *   "template": "opsdesk",
 *   "admin": { "name": "Ada", "auth": "ada", "password": "correct horse" }
 * }
 * ```
 */
pub async fn tenant_create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTenant>,
) -> ApiResult<Tenant> {
    payload.validate()?;
    tracing::info!(tenant = %payload.name, by = %auth_user.user, "Tenant creation requested");
    let tenant = TenantService::new().await?.create_tenant(&payload).await?;
    Ok(ApiResponse::created(tenant))
}
