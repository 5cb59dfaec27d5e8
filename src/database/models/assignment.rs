use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

crate::text_enum! {
    pub enum AssignmentStatus {
        Assigned => "assigned",
        PartiallyReturned => "partially_returned",
        Returned => "returned",
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub returned_quantity: i32,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Assignment {
    /// Units still held by the user.
    pub fn outstanding(&self) -> i32 {
        self.quantity - self.returned_quantity
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignAsset {
    pub asset_id: Uuid,
    pub user_id: Uuid,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    pub assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtendAssignment {
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub additional_quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReturnAsset {
    /// Ignored for individual assets, which always return their single unit.
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub return_quantity: Option<i32>,
    pub return_date: Option<DateTime<Utc>>,
}
