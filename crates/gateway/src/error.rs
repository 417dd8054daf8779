//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use huddle_database::{DatabaseError, MessageError};
use huddle_relay::RelayError;
use huddle_users::UserError;
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream completion failed: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::DatabaseError(_) | GatewayError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<UserError> for GatewayError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::Unauthorized => {
                GatewayError::Unauthorized("Missing or invalid identity".to_string())
            }
            UserError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            UserError::UserAlreadyExists => {
                GatewayError::Conflict("User already exists".to_string())
            }
            UserError::ConversationNotFound { id } => {
                GatewayError::NotFound(format!("Conversation {id} not found"))
            }
            UserError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<MessageError> for GatewayError {
    fn from(error: MessageError) -> Self {
        match error {
            MessageError::ConversationNotFound { id } => {
                GatewayError::NotFound(format!("Conversation {id} not found"))
            }
            MessageError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<RelayError> for GatewayError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::Completion(err) => GatewayError::Upstream(err.to_string()),
            RelayError::Delivery(err) => err.into(),
        }
    }
}

impl From<DatabaseError> for GatewayError {
    fn from(error: DatabaseError) -> Self {
        GatewayError::DatabaseError(error.to_string())
    }
}
