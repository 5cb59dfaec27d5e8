// handlers/elevated/root/tenant/health.rs - GET /api/root/tenant/:name/health handler

use axum::extract::Path;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{TenantHealth, TenantService};

/// GET /api/root/tenant/:name/health - Registry state and database reachability
pub async fn tenant_health(Path(name): Path<String>) -> ApiResult<TenantHealth> {
    let health = TenantService::new().await?.tenant_health(&name).await?;
    Ok(ApiResponse::success(health))
}
