// handlers/protected/roles.rs - Role permission sets

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{CreateRole, Role, UpdateRole};
use crate::database::repositories::RoleRepo;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::types::{permissions, Access};

fn check_permissions(requested: &[String]) -> Result<(), ApiError> {
    match requested.iter().find(|p| p.as_str() != "*" && !permissions::ALL.contains(&p.as_str())) {
        Some(unknown) => Err(ApiError::validation_error(
            format!("permissions: unknown permission '{}'", unknown),
            None,
        )),
        None => Ok(()),
    }
}

/// GET /api/roles
pub async fn roles_get(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Role>> {
    user.authorize(Access::Read, None)?;
    Ok(ApiResponse::success(RoleRepo::list(&pool).await?))
}

/// POST /api/roles
pub async fn roles_post(
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<CreateRole>,
) -> ApiResult<Role> {
    user.authorize(Access::Full, None)?;
    payload.validate()?;
    check_permissions(&payload.permissions)?;

    let role = RoleRepo::create(&pool, &payload).await?;
    tracing::info!(role = %role.name, permissions = ?role.permissions, "Role created");
    Ok(ApiResponse::created(role))
}

/// PUT /api/roles/:id
pub async fn role_put(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<UpdateRole>,
) -> ApiResult<Role> {
    user.authorize(Access::Full, None)?;
    payload.validate()?;
    if let Some(requested) = &payload.permissions {
        check_permissions(requested)?;
    }

    let role = RoleRepo::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;
    tracing::info!(role = %role.name, permissions = ?role.permissions, "Role updated");
    Ok(ApiResponse::success(role))
}

/// DELETE /api/roles/:id - Users holding the role are left without one
pub async fn role_delete(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Value> {
    user.authorize(Access::Full, None)?;
    if !RoleRepo::delete(&pool, id).await? {
        return Err(ApiError::not_found("Role not found"));
    }
    tracing::info!(role_id = %id, "Role deleted");
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_wildcard_permissions_pass() {
        assert!(check_permissions(&["assets.assign".into(), "*".into()]).is_ok());
        let err = check_permissions(&["payroll.run".into()]).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
