use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

crate::text_enum! {
    pub enum ScopeKind {
        Company => "company",
        Department => "department",
        Team => "team",
    }
}

impl ScopeKind {
    /// Depth in the organisation tree; a parent always ranks lower than its children.
    pub fn rank(self) -> u8 {
        match self {
            ScopeKind::Company => 0,
            ScopeKind::Department => 1,
            ScopeKind::Team => 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Scope {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub kind: ScopeKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScope {
    pub parent_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub kind: ScopeKind,
}
