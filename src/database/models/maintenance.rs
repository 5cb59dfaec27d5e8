use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

crate::text_enum! {
    pub enum MaintenanceStatus {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Maintenance {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub description: String,
    pub status: MaintenanceStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaintenance {
    pub asset_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub description: String,
    pub status: MaintenanceStatus,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMaintenance {
    #[validate(length(min = 1, max = 2000))]
    pub description: Option<String>,
    pub status: MaintenanceStatus,
}
