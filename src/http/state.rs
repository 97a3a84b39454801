//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::FullRepository;
use crate::services::ReleaseBoard;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for backend operations
    pub repository: Arc<dyn FullRepository>,
    /// In-memory release checkbox state shared across handlers
    pub release_board: ReleaseBoard,
}

impl AppState {
    /// Create a new application state with the given repository.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self {
            repository,
            release_board: ReleaseBoard::new(),
        }
    }
}
