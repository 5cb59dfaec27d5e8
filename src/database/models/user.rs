use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::types::Access;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub auth: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub access: Access,
    pub role_id: Option<Uuid>,
    pub scope_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission || p == "*")
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 2, max = 100))]
    pub auth: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub access: Option<Access>,
    pub role_id: Option<Uuid>,
    pub scope_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
    pub access: Option<Access>,
    pub role_id: Option<Uuid>,
    pub scope_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRole {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRole {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_stays_server_side() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Jane".into(),
            auth: "jane".into(),
            password_hash: "$argon2id$secret".into(),
            access: Access::Edit,
            role_id: None,
            scope_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["access"], "edit");
    }

    #[test]
    fn wildcard_role_grants_everything() {
        let role = Role {
            id: Uuid::new_v4(),
            name: "ops".into(),
            permissions: vec!["*".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(role.grants("assets.assign"));
    }
}
