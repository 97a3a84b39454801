//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::services::DispatchError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// The backend refused the commit
    Rejected(String),
    /// The backend could not be reached
    Unavailable(String),
    /// Internal server error
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Rejected(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("REJECTED", msg),
            ),
            AppError::Unavailable(msg) => (
                StatusCode::BAD_GATEWAY,
                ApiError::new("BACKEND_UNAVAILABLE", "The operation could not be completed. Please try again.").with_details(msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Validation(msg) => AppError::BadRequest(msg),
            DispatchError::Rejected { message } => AppError::Rejected(message),
            DispatchError::Transport(inner) => AppError::Unavailable(inner.to_string()),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => AppError::NotFound(message),
            RepositoryError::ValidationError { message, .. } => AppError::BadRequest(message),
            RepositoryError::Rejected { message, .. } => AppError::Rejected(message),
            other if other.is_retryable() => AppError::Unavailable(other.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err: AppError = DispatchError::validation("No replacement selected").into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejected_commit_maps_to_unprocessable() {
        let err: AppError = DispatchError::Rejected {
            message: "Line already closed".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Rejected(_)));
    }

    #[test]
    fn missing_day_maps_to_not_found() {
        let err: AppError = RepositoryError::not_found("No dispatch for date").into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn connection_failure_maps_to_unavailable() {
        let err: AppError = RepositoryError::connection("refused").into();
        assert!(matches!(err, AppError::Unavailable(_)));
    }
}
