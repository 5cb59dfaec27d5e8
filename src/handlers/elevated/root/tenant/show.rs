// handlers/elevated/root/tenant/show.rs - GET /api/root/tenant/:name handler

use axum::extract::Path;

use crate::database::models::Tenant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

/// GET /api/root/tenant/:name
pub async fn tenant_show(Path(name): Path<String>) -> ApiResult<Tenant> {
    let tenant = TenantService::new().await?.get_tenant(&name).await?;
    Ok(ApiResponse::success(tenant))
}
