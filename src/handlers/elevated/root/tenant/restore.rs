// handlers/elevated/root/tenant/restore.rs - POST /api/root/tenant/:name/restore handler

use axum::extract::Path;

use crate::database::models::Tenant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

/// POST /api/root/tenant/:name/restore - Take a tenant out of the trash
pub async fn tenant_restore(Path(name): Path<String>) -> ApiResult<Tenant> {
    let tenant = TenantService::new().await?.restore_tenant(&name).await?;
    Ok(ApiResponse::success(tenant))
}
