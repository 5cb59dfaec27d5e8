// handlers/protected/assignments.rs - Assign, extend and return handlers
//
// All three accept an optional `Idempotency-Key` header. A retried request
// with the same key returns the original result with `replayed: true`.

use axum::extract::{Extension, Json, Path};
use axum::http::HeaderMap;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::idempotency_key;
use crate::database::models::{AssetType, AssignAsset, Assignment, ExtendAssignment, ReturnAsset};
use crate::middleware::{ActionResponse, ActionResult, ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::services::asset_service::{AssetService, MovementOutcome};
use crate::types::{permissions, Access};

fn units(n: i32) -> String {
    if n == 1 { "1 unit".to_string() } else { format!("{} units", n) }
}

/// POST /api/assignments - Hand units of an asset to a user
pub async fn assignments_post(
    headers: HeaderMap,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<AssignAsset>,
) -> ActionResult<MovementOutcome> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_ASSIGN))?;
    payload.validate()?;
    let key = idempotency_key(&headers)?;

    let outcome = AssetService::new(pool).assign(&user, &payload, key.as_deref()).await?;
    let message = format!(
        "{} of {} assigned; {} available",
        units(outcome.movement.quantity),
        outcome.asset.name,
        outcome.asset.available_quantity
    );
    Ok(if outcome.replayed {
        ActionResponse::ok("Asset assigned", message, outcome)
    } else {
        ActionResponse::created("Asset assigned", message, outcome)
    })
}

/// GET /api/assignments/:id - Single assignment
pub async fn assignment_get(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Assignment> {
    user.authorize(Access::Read, None)?;
    let assignment = AssetService::new(pool).get_assignment(&user, id).await?;
    Ok(ApiResponse::success(assignment))
}

/// POST /api/assignments/:id/extend - Give the same user more units of a group asset
pub async fn assignment_extend_post(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<ExtendAssignment>,
) -> ActionResult<MovementOutcome> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_ASSIGN))?;
    payload.validate()?;
    let key = idempotency_key(&headers)?;

    let outcome = AssetService::new(pool)
        .extend(&user, id, payload.additional_quantity, key.as_deref())
        .await?;
    let message = format!(
        "{} more of {}; now holding {}",
        units(outcome.movement.quantity),
        outcome.asset.name,
        outcome.assignment.quantity
    );
    Ok(ActionResponse::ok("Assignment extended", message, outcome))
}

/// POST /api/assignments/:id/return - Take units back
///
/// Individual assets always return their single unit. Group assets return
/// `return_quantity`, or everything still outstanding when it is omitted.
pub async fn assignment_return_post(
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<ReturnAsset>,
) -> ActionResult<MovementOutcome> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_RETURN))?;
    payload.validate()?;
    let key = idempotency_key(&headers)?;

    let outcome = AssetService::new(pool).return_asset(&user, id, &payload, key.as_deref()).await?;
    let message = match outcome.asset.asset_type {
        AssetType::Individual => format!("{} is back", outcome.asset.name),
        AssetType::Group => format!(
            "{} of {} returned; {} still out",
            units(outcome.movement.quantity),
            outcome.asset.name,
            outcome.assignment.outstanding()
        ),
    };
    Ok(ActionResponse::ok("Asset returned", message, outcome))
}

/// DELETE /api/assignments/:id - Remove a fully returned assignment
pub async fn assignment_delete(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ActionResult<Value> {
    user.authorize(Access::Edit, Some(permissions::ASSETS_RETURN))?;
    AssetService::new(pool).remove_assignment(&user, id).await?;
    Ok(ActionResponse::ok("Assignment removed", "The assignment was removed", json!({ "id": id })).table_only())
}

#[cfg(test)]
mod tests {
    use super::units;

    #[test]
    fn unit_wording() {
        assert_eq!(units(1), "1 unit");
        assert_eq!(units(3), "3 units");
    }
}
