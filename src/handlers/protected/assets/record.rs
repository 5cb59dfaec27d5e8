use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{Asset, UpdateAsset};
use crate::error::ApiError;
use crate::middleware::{ActionResponse, ActionResult, ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::services::asset_service::AssetService;
use crate::types::{permissions, Access};

/// GET /api/assets/:id - Single asset
pub async fn asset_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Asset> {
    user.authorize(Access::Read, None)?;
    let asset = AssetService::new(pool).get(&user, id).await?;
    Ok(ApiResponse::success(asset))
}

/// PUT /api/assets/:id - Edit catalogue fields, or retire with `"retire": true`
pub async fn asset_put(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<UpdateAsset>,
) -> ActionResult<Asset> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_MANAGE))?;
    payload.validate()?;

    if let Some(scope_id) = payload.scope_id {
        if !user.can_see(Some(scope_id)) {
            return Err(ApiError::forbidden("Scope is outside your visibility"));
        }
    }

    let asset = AssetService::new(pool).update(&user, id, &payload).await?;
    let title = if payload.retire { "Asset retired" } else { "Asset updated" };
    Ok(ActionResponse::ok(title, format!("{} ({})", asset.name, asset.asset_code), asset))
}

/// DELETE /api/assets/:id - Soft delete; refused while units are out
pub async fn asset_delete(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ActionResult<Value> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_MANAGE))?;
    AssetService::new(pool).delete(&user, id).await?;
    Ok(ActionResponse::ok("Asset deleted", "The asset was removed", json!({ "id": id })).table_only())
}
