//! Fleet backend boundary via the Repository pattern.
//!
//! The dispatch core consumes a handful of backend contracts (day plan reads,
//! replacement and status commits, convoy and holiday reference data). This
//! module defines those contracts as traits and provides two implementations:
//!
//! - `repositories::local`: in-memory backend for unit testing and local
//!   development
//! - `repositories::remote`: HTTP client for the real backend, speaking the
//!   `{is_success, error?, value?}` JSON envelope
//!
//! Repository handles are threaded explicitly through application state;
//! there is no process-wide singleton.

// Feature flag: at least one backend must be available.
#[cfg(not(any(feature = "remote-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod error;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "remote-repo")]
pub use repositories::{RemoteConfig, RemoteRepository};
pub use repository::{DispatchRepository, FleetRepository, FullRepository};
