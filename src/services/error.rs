//! Error taxonomy for dispatcher-triggered actions.
//!
//! Three kinds, all recovered at the triggering action and surfaced to the
//! user; none are fatal to the session and none are retried automatically:
//!
//! - `Validation`: detected locally before any backend call
//! - `Rejected`: the backend answered `is_success = false`
//! - `Transport`: the call never completed (network failure, timeout,
//!   unexpected error) - presented to the user like a rejection

use crate::db::RepositoryError;

/// Result alias for service operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Local validation failure; no backend call was made.
    #[error("{0}")]
    Validation(String),

    /// The backend processed the request and refused it.
    #[error("{message}")]
    Rejected { message: String },

    /// The backend could not be reached or failed unexpectedly.
    #[error("Backend unavailable: {0}")]
    Transport(RepositoryError),
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        DispatchError::Validation(message.into())
    }

    /// Message suitable for a user-visible notification.
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Validation(msg) => msg.clone(),
            DispatchError::Rejected { message } => message.clone(),
            DispatchError::Transport(_) => {
                "The operation could not be completed. Please try again.".to_string()
            }
        }
    }
}

impl From<RepositoryError> for DispatchError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Rejected { message, .. } => DispatchError::Rejected { message },
            RepositoryError::NotFound { message, .. } => DispatchError::Rejected { message },
            other => DispatchError::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_keeps_backend_message() {
        let err: DispatchError = RepositoryError::rejected("bus 1427 is in repair").into();
        assert_eq!(err.user_message(), "bus 1427 is in repair");
    }

    #[test]
    fn test_transport_gets_generic_message() {
        let err: DispatchError = RepositoryError::timeout("deadline exceeded").into();
        assert!(matches!(err, DispatchError::Transport(_)));
        assert!(err.user_message().contains("could not be completed"));
    }

    #[test]
    fn test_validation_is_local() {
        let err = DispatchError::validation("no replacement selected");
        assert_eq!(err.user_message(), "no replacement selected");
    }
}
