// handlers/protected/skeleton.rs - Skeleton token mint and resolve

use axum::extract::{Extension, Json, Path};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::skeleton::{self, SkeletonAct, SkeletonTarget};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidatedUser};
use crate::types::Access;

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub table: String,
    pub act: SkeletonAct,
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MintedToken {
    pub token: String,
    pub target: SkeletonTarget,
    pub expires_in: i64,
}

fn secret() -> Result<&'static str, ApiError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        tracing::error!("JWT secret is not configured");
        return Err(ApiError::internal_server_error("JWT secret not configured"));
    }
    Ok(secret)
}

/// Access level a skeleton action stands for.
fn required_access(act: SkeletonAct) -> Access {
    match act {
        SkeletonAct::View => Access::Read,
        SkeletonAct::Add | SkeletonAct::Edit | SkeletonAct::Delete => Access::Edit,
    }
}

/// POST /api/skeleton - Mint a token naming a table, action and row
pub async fn skeleton_post(
    Extension(auth_user): Extension<AuthUser>,
    Extension(user): Extension<ValidatedUser>,
    Json(payload): Json<MintRequest>,
) -> ApiResult<MintedToken> {
    user.authorize(required_access(payload.act), None)?;

    let target = SkeletonTarget::new(&auth_user.database, &payload.table, payload.act, payload.id)?;
    let minutes = config::config().security.skeleton_expiry_minutes as i64;
    let token = skeleton::mint(&target, secret()?, Duration::minutes(minutes))?;

    Ok(ApiResponse::created(MintedToken {
        token,
        target,
        expires_in: minutes * 60,
    }))
}

/// GET /api/skeleton/:token - Resolve a token minted for this tenant
pub async fn skeleton_get(
    Path(token): Path<String>,
    Extension(auth_user): Extension<AuthUser>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<SkeletonTarget> {
    let target = skeleton::resolve(&token, secret()?, &auth_user.database)?;
    user.authorize(required_access(target.act), None)?;
    Ok(ApiResponse::success(target))
}
