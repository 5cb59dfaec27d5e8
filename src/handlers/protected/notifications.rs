// handlers/protected/notifications.rs - The caller's notification inbox

use axum::extract::{Extension, Path, Query};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Notification;
use crate::database::repositories::NotificationRepo;
use crate::error::ApiError;
use crate::handlers::page_window;
use crate::middleware::{ApiResponse, ApiResult, TenantPool, ValidatedUser};
use crate::types::Page;

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub unread: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/notifications - Newest first; `?unread=true` hides read ones
pub async fn notifications_get(
    Query(query): Query<InboxQuery>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Vec<Notification>> {
    let (limit, offset) = page_window(&Page { limit: query.limit, offset: query.offset });
    let notifications = NotificationRepo::list_for_user(&pool, user.id, query.unread, limit, offset).await?;
    Ok(ApiResponse::success(notifications))
}

/// POST /api/notifications/:id/read
pub async fn notification_read_post(
    Path(id): Path<Uuid>,
    Extension(TenantPool(pool)): Extension<TenantPool>,
    Extension(user): Extension<ValidatedUser>,
) -> ApiResult<Notification> {
    let notification = NotificationRepo::mark_read(&pool, id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    Ok(ApiResponse::success(notification))
}
