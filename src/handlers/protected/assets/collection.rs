use axum::extract::{Extension, Json, Query};
use validator::Validate;

use crate::database::models::{Asset, AssetFilter, CreateAsset};
use crate::database::repositories::AssetRepo;
use crate::error::ApiError;
use crate::handlers::page_window;
use crate::middleware::{ActionResponse, ActionResult, ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::services::asset_service::AssetService;
use crate::types::{permissions, Access, Page};

/// GET /api/assets - List assets visible to the caller
///
/// Query: `status`, `asset_type`, `q` (name or code), `limit`, `offset`.
pub async fn assets_get(
    Query(filter): Query<AssetFilter>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Asset>> {
    user.authorize(Access::Read, None)?;
    let (limit, offset) = page_window(&Page { limit: filter.limit, offset: filter.offset });
    let assets = AssetRepo::list(&pool, &filter, user.scope_filter(), limit, offset).await?;
    Ok(ApiResponse::success(assets))
}

/// POST /api/assets - Register a new asset with all units available
pub async fn assets_post(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<CreateAsset>,
) -> ActionResult<Asset> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_MANAGE))?;
    payload.validate()?;

    if let Some(scope_id) = payload.scope_id {
        if !user.can_see(Some(scope_id)) {
            return Err(ApiError::forbidden("Scope is outside your visibility"));
        }
    }

    let asset = AssetService::new(pool).create(&payload).await?;
    let message = format!("{} ({}) added with {} unit(s)", asset.name, asset.asset_code, asset.quantity);
    Ok(ActionResponse::created("Asset created", message, asset).table_only())
}
