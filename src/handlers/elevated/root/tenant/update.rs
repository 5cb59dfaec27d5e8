// handlers/elevated/root/tenant/update.rs - PUT /api/root/tenant/:name handler

use axum::{extract::Path, Json};
use validator::Validate;

use crate::database::models::{Tenant, UpdateTenant};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

/// PUT /api/root/tenant/:name - Change display name or status
///
/// A tenant still awaiting payment cannot be switched to `active` here;
/// confirming a payment does that.
pub async fn tenant_update(Path(name): Path<String>, Json(payload): Json<UpdateTenant>) -> ApiResult<Tenant> {
    payload.validate()?;
    let tenant = TenantService::new().await?.update_tenant(&name, &payload).await?;
    Ok(ApiResponse::success(tenant))
}
