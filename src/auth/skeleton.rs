//! Skeleton tokens: opaque strings naming which entity, action and row a
//! popup or table request targets.
//!
//! A token is an HS256 JWT over a [`SkeletonTarget`] plus expiry, so clients
//! can hold it without being able to retarget it. The `system` field pins the
//! token to the tenant database it was minted for.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{decode_jwt, encode_jwt, AuthError};

crate::text_enum! {
    /// Action a skeleton token authorises.
    pub enum SkeletonAct {
        Add => "add",
        Edit => "edit",
        View => "view",
        Delete => "delete",
    }
}

/// Tables a skeleton token may target, with their key column.
const TABLES: &[(&str, &str)] = &[
    ("assets", "id"),
    ("asset_assignments", "id"),
    ("asset_maintenance", "id"),
    ("users", "id"),
    ("roles", "id"),
    ("scopes", "id"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonTarget {
    pub system: String,
    pub table: String,
    pub key: String,
    pub act: SkeletonAct,
    pub id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SkeletonClaims {
    #[serde(flatten)]
    target: SkeletonTarget,
    exp: i64,
    iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Unknown table '{0}'")]
    UnknownTable(String),
    #[error("Action '{0}' needs a row id")]
    MissingId(SkeletonAct),
    #[error("Token was issued for a different tenant")]
    WrongTenant,
}

impl SkeletonTarget {
    /// Build a target, resolving the key column and checking the act/id pairing.
    pub fn new(system: &str, table: &str, act: SkeletonAct, id: Option<Uuid>) -> Result<Self, TokenError> {
        let key = TABLES
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, key)| *key)
            .ok_or_else(|| TokenError::UnknownTable(table.to_string()))?;

        if act != SkeletonAct::Add && id.is_none() {
            return Err(TokenError::MissingId(act));
        }

        Ok(Self {
            system: system.to_string(),
            table: table.to_string(),
            key: key.to_string(),
            act,
            id,
        })
    }
}

pub fn mint(target: &SkeletonTarget, secret: &str, lifetime: Duration) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = SkeletonClaims {
        target: target.clone(),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
    };
    Ok(encode_jwt(&claims, secret)?)
}

/// Decode a token and make sure it belongs to `system`.
pub fn resolve(token: &str, secret: &str, system: &str) -> Result<SkeletonTarget, TokenError> {
    let claims: SkeletonClaims = decode_jwt(token, secret)?;
    if claims.target.system != system {
        return Err(TokenError::WrongTenant);
    }
    Ok(claims.target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "skeleton-secret";

    #[test]
    fn resolves_what_was_minted() {
        let id = Uuid::new_v4();
        let target = SkeletonTarget::new("tenant_aa", "assets", SkeletonAct::Edit, Some(id)).unwrap();
        let token = mint(&target, SECRET, Duration::minutes(5)).unwrap();
        let resolved = resolve(&token, SECRET, "tenant_aa").unwrap();
        assert_eq!(resolved, target);
        assert_eq!(resolved.key, "id");
    }

    #[test]
    fn rejects_other_tenants() {
        let target = SkeletonTarget::new("tenant_aa", "users", SkeletonAct::Add, None).unwrap();
        let token = mint(&target, SECRET, Duration::minutes(5)).unwrap();
        assert!(matches!(resolve(&token, SECRET, "tenant_bb"), Err(TokenError::WrongTenant)));
    }

    #[test]
    fn rejects_tampered_and_expired_tokens() {
        let target = SkeletonTarget::new("tenant_aa", "scopes", SkeletonAct::Add, None).unwrap();
        let token = mint(&target, SECRET, Duration::minutes(5)).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(resolve(&tampered, SECRET, "tenant_aa").is_err());

        let expired = mint(&target, SECRET, Duration::hours(-1)).unwrap();
        assert!(matches!(resolve(&expired, SECRET, "tenant_aa"), Err(TokenError::Auth(_))));
    }

    #[test]
    fn validates_table_and_id() {
        assert!(matches!(
            SkeletonTarget::new("tenant_aa", "payroll", SkeletonAct::View, Some(Uuid::new_v4())),
            Err(TokenError::UnknownTable(_))
        ));
        assert!(matches!(
            SkeletonTarget::new("tenant_aa", "assets", SkeletonAct::Delete, None),
            Err(TokenError::MissingId(SkeletonAct::Delete))
        ));
    }
}
