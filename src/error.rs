// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::skeleton::TokenError;
use crate::auth::AuthError;
use crate::config;
use crate::database::manager::DatabaseError;
use crate::inventory::AccountingError;
use crate::scope::ScopeError;
use crate::services::asset_service::AssetError;
use crate::services::tenant_service::TenantError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity (request is well formed but violates a business rule)
    UnprocessableEntity(String),

    // 500 Internal Server Error. Holds the real cause, which is only shown in developer mode.
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Short human title shown above the message in the client popup
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Invalid request",
            ApiError::ValidationError { .. } => "Validation failed",
            ApiError::Unauthorized(_) => "Not signed in",
            ApiError::Forbidden(_) => "Not allowed",
            ApiError::NotFound(_) => "Not found",
            ApiError::Conflict(_) => "Conflict",
            ApiError::UnprocessableEntity(_) => "Action rejected",
            ApiError::InternalServerError(_) => "Something went wrong",
            ApiError::ServiceUnavailable(_) => "Service unavailable",
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity(msg) => msg,
            ApiError::InternalServerError(detail) => {
                if config::config().security.expose_internal_errors {
                    detail
                } else {
                    "An internal error occurred"
                }
            }
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity(_) => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "status": self.status_code(),
            "title": self.title(),
            "message": self.message(),
            "code": self.error_code(),
        });

        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            body["field_errors"] = json!(field_errors);
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors: HashMap<String, String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let text = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("failed '{}' check", e.code))
                    })
                    .unwrap_or_else(|| "is invalid".to_string());
                (field.to_string(), text)
            })
            .collect();

        // Surface the first error (alphabetically by field, for stable output) as the message
        let mut fields: Vec<&String> = field_errors.keys().collect();
        fields.sort();
        let message = fields
            .first()
            .map(|f| format!("{}: {}", f, field_errors[*f]))
            .unwrap_or_else(|| "Validation failed".to_string());

        if field_errors.is_empty() {
            field_errors.insert("_".to_string(), message.clone());
        }
        ApiError::validation_error(message, Some(field_errors))
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::InvalidTenantName(name) => {
                ApiError::bad_request(format!("Invalid tenant database name: {}", name))
            }
            DatabaseError::ConfigMissing(key) => {
                tracing::error!("Missing configuration: {}", key);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("DATABASE_URL could not be parsed");
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::Migrate(e) => {
                tracing::error!("Migration error: {}", e);
                ApiError::internal_server_error(format!("migration failed: {}", e))
            }
            DatabaseError::Sqlx(e) => e.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            sqlx::Error::PoolTimedOut => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    ApiError::conflict(format!("Duplicate value violates unique constraint: {}", constraint))
                }
                // foreign_key_violation
                Some("23503") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    ApiError::unprocessable(format!("Referenced record does not exist: {}", constraint))
                }
                // check_violation
                Some("23514") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    ApiError::unprocessable(format!("Value violates check constraint: {}", constraint))
                }
                _ => {
                    tracing::error!("Database error: {}", db_err);
                    ApiError::internal_server_error(db_err.to_string())
                }
            },
            other => {
                tracing::error!("SQLx error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<AccountingError> for ApiError {
    fn from(err: AccountingError) -> Self {
        match err {
            AccountingError::AlreadyAssigned
            | AccountingError::AlreadyReturned
            | AccountingError::DuplicateAssignment => ApiError::conflict(err.to_string()),
            _ => ApiError::unprocessable(err.to_string()),
        }
    }
}

impl From<AssetError> for ApiError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::NotFound(_) => ApiError::not_found(err.to_string()),
            AssetError::Accounting(e) => e.into(),
            AssetError::KeyReused => ApiError::conflict(err.to_string()),
            AssetError::Database(e) => e.into(),
        }
    }
}

impl From<ScopeError> for ApiError {
    fn from(err: ScopeError) -> Self {
        match err {
            ScopeError::HasChildren => ApiError::conflict(err.to_string()),
            ScopeError::UnknownParent(_) | ScopeError::Cycle(_) | ScopeError::KindOrder { .. } => {
                ApiError::unprocessable(err.to_string())
            }
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::AlreadyExists(_) => ApiError::conflict(err.to_string()),
            TenantError::NotFound(_)
            | TenantError::DeviceNotFound(_)
            | TenantError::PaymentNotFound(_) => ApiError::not_found(err.to_string()),
            TenantError::TemplateNotFound(_) | TenantError::InvalidPayment(_) => {
                ApiError::unprocessable(err.to_string())
            }
            TenantError::InvalidName(msg) => ApiError::validation_error(msg, None),
            TenantError::InvalidState(_) => ApiError::conflict(err.to_string()),
            TenantError::Auth(e) => e.into(),
            TenantError::Database(e) => e.into(),
            TenantError::DatabaseManager(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidSecret => {
                tracing::error!("JWT secret is not configured");
                ApiError::internal_server_error("JWT secret not configured")
            }
            AuthError::InvalidToken(msg) => ApiError::unauthorized(msg),
            AuthError::RefreshWindowExpired => ApiError::unauthorized(err.to_string()),
            AuthError::TokenGeneration(msg) | AuthError::PasswordHash(msg) => {
                tracing::error!("Auth failure: {}", msg);
                ApiError::internal_server_error(msg)
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Auth(e) => e.into(),
            TokenError::WrongTenant => ApiError::forbidden(err.to_string()),
            TokenError::UnknownTable(_) | TokenError::MissingId(_) => {
                ApiError::bad_request(err.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[test]
    fn envelope_carries_status_and_title() {
        let body = ApiError::conflict("asset already assigned").to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 409);
        assert_eq!(body["title"], "Conflict");
        assert_eq!(body["message"], "asset already assigned");
        assert_eq!(body["code"], "CONFLICT");
    }

    #[test]
    fn validation_errors_surface_first_field() {
        let sample = Sample { name: String::new(), quantity: 0 };
        let err: ApiError = sample.validate().unwrap_err().into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "name: must not be empty");
        let body = err.to_json();
        assert!(body["field_errors"]["quantity"].is_string());
    }

    #[test]
    fn accounting_conflicts_map_to_409() {
        let err: ApiError = AccountingError::AlreadyReturned.into();
        assert_eq!(err.status_code(), 409);
        let err: ApiError = AccountingError::InsufficientQuantity { requested: 3, available: 1 }.into();
        assert_eq!(err.status_code(), 422);
    }
}
