// handlers/elevated/root/tenant/delete.rs - DELETE /api/root/tenant/:name handler

use axum::extract::Path;

use crate::database::models::Tenant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

/// DELETE /api/root/tenant/:name - Move to trash; the database is kept
pub async fn tenant_delete(Path(name): Path<String>) -> ApiResult<Tenant> {
    let tenant = TenantService::new().await?.trash_tenant(&name).await?;
    Ok(ApiResponse::success(tenant))
}
