// handlers/protected/maintenance.rs - POST /api/maintenance, PUT /api/maintenance/:id

use axum::extract::{Extension, Json, Path};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{CreateMaintenance, UpdateMaintenance};
use crate::middleware::{ActionResponse, ActionResult, TenantPool, ValidatedUser};
use crate::services::asset_service::{AssetService, MaintenanceOutcome};
use crate::types::{permissions, Access};

/// POST /api/maintenance - Record maintenance on an asset
///
/// `scheduled` and `in_progress` take the asset out of circulation.
/// A record created directly as `completed` leaves the asset status alone.
pub async fn maintenance_post(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<CreateMaintenance>,
) -> ActionResult<MaintenanceOutcome> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_MAINTAIN))?;
    payload.validate()?;

    let outcome = AssetService::new(pool).open_maintenance(&user, &payload).await?;
    let message = format!("{} is now {}", outcome.asset.name, outcome.asset.status);
    Ok(ActionResponse::created("Maintenance recorded", message, outcome))
}

/// PUT /api/maintenance/:id - Move a maintenance record along
///
/// Completing it puts the asset back to the status its quantities imply.
pub async fn maintenance_put(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<UpdateMaintenance>,
) -> ActionResult<MaintenanceOutcome> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_MAINTAIN))?;
    payload.validate()?;

    let outcome = AssetService::new(pool).update_maintenance(&user, id, &payload).await?;
    let message = format!("{} is now {}", outcome.asset.name, outcome.asset.status);
    Ok(ActionResponse::ok("Maintenance updated", message, outcome))
}
