// handlers/elevated/root/tenant/list.rs - GET /api/root/tenant handler

use axum::extract::Query;
use serde::Deserialize;

use crate::database::models::Tenant;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Include tenants in the trash.
    #[serde(default)]
    pub include_trashed: bool,
}

/// GET /api/root/tenant - All registered tenants
pub async fn tenant_list(Query(query): Query<ListQuery>) -> ApiResult<Vec<Tenant>> {
    let tenants = TenantService::new().await?.list_tenants(query.include_trashed).await?;
    Ok(ApiResponse::success(tenants))
}
