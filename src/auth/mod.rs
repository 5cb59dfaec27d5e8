pub mod skeleton;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::types::Access;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub tenant: String,
    pub user: String,
    pub database: String,
    pub access: Access,
    pub user_id: Uuid,
    /// Elevated session issued by POST /api/auth/sudo
    #[serde(default)]
    pub is_sudo: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(tenant: String, user: String, database: String, access: Access, user_id: Uuid) -> Self {
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self::with_lifetime(tenant, user, database, access, user_id, Duration::hours(expiry_hours as i64))
    }

    pub fn with_lifetime(
        tenant: String,
        user: String,
        database: String,
        access: Access,
        user_id: Uuid,
        lifetime: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            tenant,
            user,
            database,
            access,
            user_id,
            is_sudo: false,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Same identity, short-lived and flagged for /api/root access.
    pub fn elevate(&self) -> Self {
        let minutes = config::config().security.sudo_expiry_minutes;
        let mut claims = Self::with_lifetime(
            self.tenant.clone(),
            self.user.clone(),
            self.database.clone(),
            self.access,
            self.user_id,
            Duration::minutes(minutes as i64),
        );
        claims.is_sudo = true;
        claims
    }

    /// Same identity with a fresh expiry; sudo is never carried over.
    pub fn renewed(&self) -> Self {
        Self::new(
            self.tenant.clone(),
            self.user.clone(),
            self.database.clone(),
            self.access,
            self.user_id,
        )
    }

    pub fn expires_in(&self) -> i64 {
        (self.exp - Utc::now().timestamp()).max(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Token is past its refresh window")]
    RefreshWindowExpired,
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

fn jwt_secret() -> Result<&'static str, AuthError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    encode_jwt(claims, jwt_secret()?)
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    decode_jwt(token, jwt_secret()?)
}

/// Sign any serializable claim set with HS256.
pub fn encode_jwt<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry of an HS256 token.
pub fn decode_jwt<T: for<'de> Deserialize<'de>>(token: &str, secret: &str) -> Result<T, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<T>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
}

/// Verify the signature of a possibly-expired session token, accepting it
/// only while `exp + window_days` is still in the future.
pub fn decode_for_refresh(token: &str, secret: &str, window_days: i64) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let deadline = claims.exp + Duration::days(window_days).num_seconds();
    if deadline < Utc::now().timestamp() {
        return Err(AuthError::RefreshWindowExpired);
    }
    Ok(claims)
}

pub fn refresh_jwt(token: &str) -> Result<Claims, AuthError> {
    decode_for_refresh(token, jwt_secret()?, config::config().security.refresh_window_days)
}

/// Hash a plaintext password with Argon2id and a random salt (PHC string).
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a plaintext password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims(lifetime: Duration) -> Claims {
        Claims::with_lifetime(
            "acme".to_string(),
            "jdoe".to_string(),
            "tenant_0123456789abcdef".to_string(),
            Access::Edit,
            Uuid::new_v4(),
            lifetime,
        )
    }

    #[test]
    fn jwt_round_trip_keeps_identity() {
        let original = claims(Duration::hours(1));
        let token = encode_jwt(&original, SECRET).unwrap();
        let decoded: Claims = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(decoded.user_id, original.user_id);
        assert_eq!(decoded.access, Access::Edit);
        assert!(!decoded.is_sudo);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_jwt(&claims(Duration::hours(1)), SECRET).unwrap();
        let result: Result<Claims, _> = decode_jwt(&token, "other-secret");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_fails_normal_decode_but_refreshes_inside_window() {
        let token = encode_jwt(&claims(Duration::hours(-2)), SECRET).unwrap();
        let result: Result<Claims, _> = decode_jwt(&token, SECRET);
        assert!(result.is_err());
        assert!(decode_for_refresh(&token, SECRET, 7).is_ok());
    }

    #[test]
    fn refresh_rejects_tokens_past_the_window() {
        let token = encode_jwt(&claims(Duration::days(-10)), SECRET).unwrap();
        assert!(matches!(
            decode_for_refresh(&token, SECRET, 7),
            Err(AuthError::RefreshWindowExpired)
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(encode_jwt(&claims(Duration::hours(1)), ""), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct-horse-battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
