use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

crate::text_enum! {
    pub enum AssetType {
        /// Serial-numbered single item (laptop, phone)
        Individual => "individual_asset",
        /// Pool of interchangeable units (chairs, headsets)
        Group => "group_asset",
    }
}

crate::text_enum! {
    pub enum AssetStatus {
        Available => "available",
        PartiallyAssigned => "partially_assigned",
        Assigned => "assigned",
        PartiallyReturned => "partially_returned",
        UnderMaintenance => "under_maintenance",
        Retired => "retired",
    }
}

impl AssetStatus {
    /// Statuses from which new units may be handed out.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            AssetStatus::Available | AssetStatus::PartiallyAssigned | AssetStatus::PartiallyReturned
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub asset_code: String,
    pub name: String,
    pub asset_type: AssetType,
    pub quantity: i32,
    pub available_quantity: i32,
    pub status: AssetStatus,
    pub scope_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 64))]
    pub asset_code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub asset_type: AssetType,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: i32,
    pub scope_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Editable catalogue fields. Quantities and status move only through
/// assignment, return and maintenance, except `retire`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub scope_id: Option<Uuid>,
    pub notes: Option<String>,
    #[serde(default)]
    pub retire: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    pub asset_type: Option<AssetType>,
    /// Case-insensitive match on name or asset code.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
