//! Depot dispatch engine: daily assignment views, replacement decisions and
//! release tracking for a bus fleet.
//!
//! The crate is layered the same way the deployment is:
//!
//! - [`api`] - shared domain types (assignments, routes, convoys, statuses)
//! - [`models`] - calendar classification of service days
//! - [`db`] - repository abstraction with in-memory and remote backends
//! - [`services`] - dispatch decision logic over the repository boundary
//! - [`http`] - the axum REST/SSE surface (feature `http-server`)

pub mod api;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
