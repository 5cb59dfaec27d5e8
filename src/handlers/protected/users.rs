// handlers/protected/users.rs - Tenant user management
//
// Reading needs `read`; creating, editing and deleting users needs `full`.
// Nobody can grant an access level above their own.

use axum::extract::{Extension, Json, Path, Query};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::auth::hash_password;
use crate::database::models::{CreateUser, UpdateUser, User};
use crate::database::repositories::UserRepo;
use crate::error::ApiError;
use crate::handlers::page_window;
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::types::{Access, Page};

fn check_grant(caller: &ValidatedUser, granted: Option<Access>) -> Result<(), ApiError> {
    match granted {
        Some(access) if !caller.access.allows(access) => Err(ApiError::forbidden(format!(
            "Cannot grant '{}' access with '{}' access",
            access, caller.access
        ))),
        _ => Ok(()),
    }
}

fn check_scope(caller: &ValidatedUser, scope_id: Option<Uuid>) -> Result<(), ApiError> {
    if caller.can_see(scope_id) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Scope is outside your visibility"))
    }
}

/// GET /api/users - Users in the caller's visible scopes
pub async fn users_get(
    Query(page): Query<Page>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<User>> {
    user.authorize(Access::Read, None)?;
    let (limit, offset) = page_window(&page);
    let users = UserRepo::list(&pool, user.scope_filter(), limit, offset).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/users - Create a user with an argon2-hashed password
pub async fn users_post(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<CreateUser>,
) -> ApiResult<User> {
    user.authorize(Access::Full, None)?;
    payload.validate()?;
    check_grant(&user, payload.access)?;
    check_scope(&user, payload.scope_id)?;

    let password_hash = hash_password(&payload.password)?;
    let created = UserRepo::create(
        &pool,
        &payload.name,
        &payload.auth,
        &password_hash,
        payload.access.unwrap_or(Access::Read),
        payload.role_id,
        payload.scope_id,
    )
    .await?;

    tracing::info!(user = %created.auth, access = %created.access, by = %user.auth, "User created");
    Ok(ApiResponse::created(created))
}

/// GET /api/users/:id
pub async fn user_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<User> {
    user.authorize(Access::Read, None)?;
    let found = UserRepo::find_by_id(&pool, id)
        .await?
        .filter(|found| user.can_see(found.scope_id))
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(found))
}

/// PUT /api/users/:id - Partial update; a new password is re-hashed
pub async fn user_put(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<User> {
    user.authorize(Access::Full, None)?;
    payload.validate()?;
    check_grant(&user, payload.access)?;
    check_scope(&user, payload.scope_id)?;

    let existing = UserRepo::find_by_id(&pool, id)
        .await?
        .filter(|found| user.can_see(found.scope_id))
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !user.access.allows(existing.access) {
        return Err(ApiError::forbidden("Cannot edit a user with higher access"));
    }

    let password_hash = payload.password.as_deref().map(hash_password).transpose()?;
    let updated = UserRepo::update(&pool, id, &payload, password_hash.as_deref())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user = %updated.auth, access = %updated.access, by = %user.auth, "User updated");
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/users/:id - Soft delete
pub async fn user_delete(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Value> {
    user.authorize(Access::Full, None)?;
    if id == user.id {
        return Err(ApiError::conflict("You cannot delete your own account"));
    }

    let existing = UserRepo::find_by_id(&pool, id)
        .await?
        .filter(|found| user.can_see(found.scope_id))
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    if !user.access.allows(existing.access) {
        return Err(ApiError::forbidden("Cannot delete a user with higher access"));
    }

    UserRepo::soft_delete(&pool, id).await?;
    tracing::info!(user = %existing.auth, by = %user.auth, "User deleted");
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
