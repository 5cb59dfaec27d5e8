// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

use serde::Serialize;
use uuid::Uuid;

use crate::types::Access;

pub mod login;   // POST /auth/login/:tenant/:user - authenticate and get JWT
pub mod refresh; // POST /auth/refresh/:tenant/:user - renew an expired JWT

pub use login::login_post;
pub use refresh::refresh_post;

/// Body returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: TokenUser,
}

#[derive(Debug, Serialize)]
pub struct TokenUser {
    pub id: Uuid,
    pub name: String,
    pub auth: String,
    pub tenant: String,
    pub access: Access,
}
