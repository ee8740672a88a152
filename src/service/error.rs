//! HTTP error mapping.
//!
//! Every failure leaves the service as `{"success": false, "message": ...}`.
//! Server faults carry their internal detail only into the log.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::store::ClearError;
use crate::validation::ValidationError;

/// Message returned for every server fault.
pub const SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// Error body shared by all failing responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Client-safe message.
    pub message: String,
}

impl ErrorResponse {
    /// Create an error body.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Errors produced by request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client payload rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing, invalid or expired credential.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Bulk delete without the confirmation sentinel.
    #[error("Confirmation required. Send {{\"confirmation\": \"{}\"}}", crate::store::CONFIRM_DELETE_ALL)]
    ConfirmationRequired,

    /// No route matched.
    #[error("Route not found")]
    NotFound,

    /// Store or other unexpected fault. The detail is never sent to clients.
    #[error("Server error: {0}")]
    Server(String),
}

impl ApiError {
    /// Wrap a store failure.
    pub fn store(err: impl std::error::Error) -> Self {
        Self::Server(err.to_string())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::ConfirmationRequired => StatusCode::BAD_REQUEST,
            ApiError::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            SERVER_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl<E: std::error::Error + 'static> From<ClearError<E>> for ApiError {
    fn from(err: ClearError<E>) -> Self {
        match err {
            ClearError::ConfirmationRequired => ApiError::ConfirmationRequired,
            ClearError::Store(e) => ApiError::store(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(ValidationError::InvalidInput(format!(
            "Invalid JSON payload: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
