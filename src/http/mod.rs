//! HTTP surface for the dispatch engine.
//!
//! An axum REST API over the service layer: dispatch day views, convoy
//! summaries, replacement and release commits, and an SSE feed of scheduled
//! repairs. Handlers stay thin; all decisions happen in [`crate::services`]
//! and all persistence behind [`crate::db::FullRepository`].

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
