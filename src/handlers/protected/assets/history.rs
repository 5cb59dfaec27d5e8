use axum::extract::{Extension, Path};
use uuid::Uuid;

use crate::database::models::{Assignment, Maintenance, Movement};
use crate::database::repositories::{AssignmentRepo, MaintenanceRepo, MovementRepo};
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::services::asset_service::AssetService;
use crate::types::Access;

/// GET /api/assets/:id/movements - Audit log, oldest first
pub async fn asset_movements_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Movement>> {
    user.authorize(Access::Read, None)?;
    AssetService::new(pool.clone()).get(&user, id).await?;
    Ok(ApiResponse::success(MovementRepo::list_for_asset(&pool, id).await?))
}

/// GET /api/assets/:id/assignments - Live assignments of the asset
pub async fn asset_assignments_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Assignment>> {
    user.authorize(Access::Read, None)?;
    AssetService::new(pool.clone()).get(&user, id).await?;
    Ok(ApiResponse::success(AssignmentRepo::list_for_asset(&pool, id).await?))
}

/// GET /api/assets/:id/maintenance - Maintenance records of the asset
pub async fn asset_maintenance_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Maintenance>> {
    user.authorize(Access::Read, None)?;
    AssetService::new(pool.clone()).get(&user, id).await?;
    Ok(ApiResponse::success(MaintenanceRepo::list_for_asset(&pool, id).await?))
}
