//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use steward_types::error::SessionError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Session(SessionError),
    /// Bad query or body input.
    Validation(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl AppError {
    /// Machine-readable code and user-facing message.
    pub fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::Session(SessionError::NotFound) => {
                ("SESSION_NOT_FOUND", "Session not found".to_string())
            }
            AppError::Session(e @ SessionError::InvalidId(_)) => ("INVALID_SESSION_ID", e.to_string()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = self.code_and_message();
        tracing::debug!(code, %message, "Request rejected");
        ApiResponse::<()>::error(code, &message, String::new(), 0).into_response()
    }
}
