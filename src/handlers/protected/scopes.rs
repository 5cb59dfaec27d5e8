// handlers/protected/scopes.rs - Organisation tree (company → department → team)

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{CreateScope, Scope};
use crate::database::repositories::ScopeRepo;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::scope::ScopeTree;
use crate::types::Access;

/// GET /api/scopes - Scopes the caller can see
pub async fn scopes_get(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Scope>> {
    user.authorize(Access::Read, None)?;
    let scopes = ScopeRepo::list(&pool)
        .await?
        .into_iter()
        .filter(|scope| user.can_see(Some(scope.id)))
        .collect();
    Ok(ApiResponse::success(scopes))
}

/// POST /api/scopes - Add a node under an existing parent (or a new root)
pub async fn scopes_post(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<CreateScope>,
) -> ApiResult<Scope> {
    user.authorize(Access::Full, None)?;
    payload.validate()?;

    let tree = ScopeTree::new(&ScopeRepo::list(&pool).await?);
    tree.check_parent(Uuid::new_v4(), payload.kind, payload.parent_id)?;

    let scope = ScopeRepo::create(&pool, &payload).await?;
    tracing::info!(scope = %scope.name, kind = %scope.kind, parent = ?scope.parent_id, "Scope created");
    Ok(ApiResponse::created(scope))
}

/// DELETE /api/scopes/:id - Only leaf scopes can be removed
pub async fn scope_delete(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Value> {
    user.authorize(Access::Full, None)?;

    let tree = ScopeTree::new(&ScopeRepo::list(&pool).await?);
    if !tree.contains(id) {
        return Err(ApiError::not_found("Scope not found"));
    }
    tree.check_removable(id)?;

    ScopeRepo::delete(&pool, id).await?;
    tracing::info!(scope_id = %id, "Scope deleted");
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
