// handlers/public/device.rs - POST /devices/provision handler

use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::database::models::Device;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::TenantService;

#[derive(Debug, Deserialize, Validate)]
pub struct ProvisionRequest {
    #[validate(length(min = 1, max = 100))]
    pub serial_number: String,
    #[validate(length(min = 1))]
    pub provisioning_secret: String,
}

/// POST /devices/provision - One-time handshake from a biometric terminal
///
/// The terminal presents the serial number and the secret handed out at
/// registration. Repeating the handshake after success is harmless.
pub async fn device_provision(Json(payload): Json<ProvisionRequest>) -> ApiResult<Device> {
    payload.validate()?;
    let device = TenantService::new()
        .await?
        .provision_device(&payload.serial_number, &payload.provisioning_secret)
        .await?;
    Ok(ApiResponse::success(device))
}
