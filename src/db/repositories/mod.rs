//! Repository implementations module.
//!
//! This module contains different implementations of the repository traits:
//! - `local`: In-memory implementation for unit testing and local development
//! - `remote`: HTTP client for the real fleet backend (JSON envelope contract)
pub mod local;
#[cfg(feature = "remote-repo")]
pub mod remote;

pub use local::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use remote::{RemoteConfig, RemoteRepository};
