// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Everything a logged-in tenant user does: assets and their movements,
// maintenance, people and organisation, lookups and notifications.
//
// Security Level: JWT Authentication Required
// Route Prefix: /api/*
// Middleware: jwt_auth → validate_tenant → validate_user

pub mod assets;        // Asset catalogue and history
pub mod assignments;   // Assign, extend, return
pub mod auth;          // whoami, sudo
pub mod maintenance;   // Maintenance records
pub mod notifications; // Per-user inbox
pub mod options;       // Select option lists
pub mod roles;         // Role permission sets
pub mod scopes;        // Organisation tree
pub mod skeleton;      // Skeleton token mint/resolve
pub mod users;         // Tenant users

use axum::http::HeaderMap;

use crate::error::ApiError;

const IDEMPOTENCY_HEADER: &str = "idempotency-key";

/// Optional `Idempotency-Key` header, trimmed. Blank counts as absent.
pub(crate) fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };
    let key = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Idempotency-Key must be visible ASCII"))?
        .trim();
    if key.is_empty() {
        return Ok(None);
    }
    if key.len() > 255 {
        return Err(ApiError::bad_request("Idempotency-Key must be at most 255 characters"));
    }
    Ok(Some(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn idempotency_key_is_optional_and_trimmed() {
        let mut headers = HeaderMap::new();
        assert_eq!(idempotency_key(&headers).unwrap(), None);

        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_static("  "));
        assert_eq!(idempotency_key(&headers).unwrap(), None);

        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_static(" abc-123 "));
        assert_eq!(idempotency_key(&headers).unwrap().as_deref(), Some("abc-123"));
    }

    #[test]
    fn overlong_idempotency_key_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(IDEMPOTENCY_HEADER, HeaderValue::from_str(&"k".repeat(256)).unwrap());
        assert_eq!(idempotency_key(&headers).unwrap_err().status_code(), 400);
    }
}
