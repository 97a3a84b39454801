//! Factory for creating repository instances.

use std::str::FromStr;
use std::sync::Arc;

use super::error::{RepositoryError, RepositoryResult};
use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
use super::repository::FullRepository;

/// Supported repository backends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory backend for tests and local development.
    Local,
    /// HTTP client for the real fleet backend.
    Remote,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(RepositoryType::Local),
            "remote" => Ok(RepositoryType::Remote),
            other => Err(format!(
                "Unknown repository type '{}' (expected 'local' or 'remote')",
                other
            )),
        }
    }
}

impl std::fmt::Display for RepositoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryType::Local => write!(f, "local"),
            RepositoryType::Remote => write!(f, "remote"),
        }
    }
}

/// Factory for repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create the in-memory backend.
    pub fn create_local() -> Arc<LocalRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the remote backend from its connection settings.
    #[cfg(feature = "remote-repo")]
    pub fn create_remote(
        config: &super::repositories::RemoteConfig,
    ) -> RepositoryResult<Arc<super::repositories::RemoteRepository>> {
        Ok(Arc::new(super::repositories::RemoteRepository::new(
            config,
        )?))
    }

    /// Create a repository from a loaded configuration file.
    pub fn create_from_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(RepositoryError::configuration)?;

        match repo_type {
            RepositoryType::Local => Ok(Self::create_local()),
            #[cfg(feature = "remote-repo")]
            RepositoryType::Remote => {
                let remote = config.to_remote_config()?.ok_or_else(|| {
                    RepositoryError::configuration(
                        "Remote repository requires a [remote] section with base_url",
                    )
                })?;
                Ok(Self::create_remote(&remote)? as Arc<dyn FullRepository>)
            }
            #[cfg(not(feature = "remote-repo"))]
            RepositoryType::Remote => Err(RepositoryError::configuration(
                "Remote repository feature not enabled",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_from_str() {
        assert_eq!("local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!(
            "Remote".parse::<RepositoryType>(),
            Ok(RepositoryType::Remote)
        );
        assert!("postgres".parse::<RepositoryType>().is_err());
    }

    #[test]
    fn test_create_local() {
        let repo = RepositoryFactory::create_local();
        let _as_full: Arc<dyn FullRepository> = repo;
    }
}
