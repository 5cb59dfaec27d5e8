// handlers/elevated/root/tenant/devices.rs - Biometric terminals of a tenant

use axum::{extract::Path, Json};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{Device, RegisterDevice};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{RegisteredDevice, TenantService};

/// GET /api/root/tenant/:name/devices
pub async fn devices_list(Path(name): Path<String>) -> ApiResult<Vec<Device>> {
    let devices = TenantService::new().await?.list_devices(&name).await?;
    Ok(ApiResponse::success(devices))
}

/// POST /api/root/tenant/:name/devices - Register a terminal
///
/// The response carries the provisioning secret. It is not shown again.
pub async fn device_register(
    Path(name): Path<String>,
    Json(payload): Json<RegisterDevice>,
) -> ApiResult<RegisteredDevice> {
    payload.validate()?;
    let device = TenantService::new().await?.register_device(&name, &payload).await?;
    Ok(ApiResponse::created(device))
}

/// POST /api/root/tenant/:name/devices/:id/revoke
pub async fn device_revoke(Path((name, id)): Path<(String, Uuid)>) -> ApiResult<Device> {
    let device = TenantService::new().await?.revoke_device(&name, id).await?;
    Ok(ApiResponse::success(device))
}
