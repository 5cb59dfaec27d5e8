use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

/// Result envelope for popup-driven actions (assign, return, maintenance).
///
/// Tells the client which views to refresh after the action went through.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub reload_table: bool,
    pub reload_card: bool,
    pub data: T,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn ok(title: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            title: title.into(),
            message: message.into(),
            reload_table: true,
            reload_card: true,
            data,
        }
    }

    pub fn created(title: impl Into<String>, message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED.as_u16(),
            ..Self::ok(title, message, data)
        }
    }

    /// Only the table needs a refresh; the detail card is unaffected.
    pub fn table_only(mut self) -> Self {
        self.reload_card = false;
        self
    }
}

impl<T: Serialize> IntoResponse for ActionResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        match serde_json::to_value(&self) {
            Ok(Value::Object(mut body)) => {
                body.insert("success".to_string(), Value::Bool(true));
                (status, Json(Value::Object(body))).into_response()
            }
            Ok(_) | Err(_) => {
                tracing::error!("Failed to serialize action response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "error": "Failed to serialize response data" })),
                )
                    .into_response()
            }
        }
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
pub type ActionResult<T> = Result<ActionResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_envelope_defaults_to_full_reload() {
        let action = ActionResponse::created("Asset assigned", "2 units assigned", json!({"id": 1}));
        assert_eq!(action.status, 201);
        assert!(action.reload_table && action.reload_card);

        let action = action.table_only();
        assert!(action.reload_table);
        assert!(!action.reload_card);
    }
}
