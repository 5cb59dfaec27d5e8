use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

crate::text_enum! {
    pub enum MovementType {
        Assigned => "assigned",
        Returned => "returned",
    }
}

/// Immutable audit row for one assignment or return.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movement {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub assignment_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub available_after: i32,
    pub actor_id: Uuid,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMovement<'a> {
    pub asset_id: Uuid,
    pub assignment_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub available_after: i32,
    pub actor_id: Uuid,
    pub idempotency_key: Option<&'a str>,
}
