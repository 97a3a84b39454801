//! Repository configuration file support.
//!
//! This module provides utilities for reading repository configuration from
//! TOML configuration files (`fleetops.toml`).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::RepositoryError;
use super::factory::RepositoryType;

/// Repository configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub remote: RemoteSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Fleet backend connection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl RepositoryConfig {
    /// Load repository configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load repository configuration from the default location.
    ///
    /// Searches for `fleetops.toml` in the current directory, then the parent.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![
            PathBuf::from("fleetops.toml"),
            PathBuf::from("../fleetops.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No fleetops.toml found in standard locations",
        ))
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Convert to remote connection settings if this is a remote configuration.
    #[cfg(feature = "remote-repo")]
    pub fn to_remote_config(
        &self,
    ) -> Result<Option<super::repositories::RemoteConfig>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type != RepositoryType::Remote {
            return Ok(None);
        }

        if self.remote.base_url.is_empty() {
            return Err(RepositoryError::configuration(
                "Remote repository requires 'remote.base_url' setting",
            ));
        }

        Ok(Some(super::repositories::RemoteConfig {
            base_url: self.remote.base_url.clone(),
            request_timeout_sec: self.remote.request_timeout_sec,
        }))
    }

    /// Convert to remote settings when the feature is disabled.
    #[cfg(not(feature = "remote-repo"))]
    pub fn to_remote_config(&self) -> Result<Option<()>, RepositoryError> {
        let repo_type = self.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        if repo_type == RepositoryType::Remote {
            return Err(RepositoryError::configuration(
                "Remote repository feature not enabled",
            ));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local_config() {
        let toml = r#"
[repository]
type = "local"
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository.repo_type, "local");
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    }

    #[cfg(feature = "remote-repo")]
    #[test]
    fn test_parse_remote_config() {
        let toml = r#"
[repository]
type = "remote"

[remote]
base_url = "https://fleet.example.org/api"
request_timeout_sec = 15
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.repository_type().unwrap(), RepositoryType::Remote);

        let remote = config.to_remote_config().unwrap().unwrap();
        assert_eq!(remote.base_url, "https://fleet.example.org/api");
        assert_eq!(remote.request_timeout_sec, 15);
    }

    #[cfg(feature = "remote-repo")]
    #[test]
    fn test_remote_requires_base_url() {
        let toml = r#"
[repository]
type = "remote"

[remote]
base_url = ""
"#;

        let config: RepositoryConfig = toml::from_str(toml).unwrap();
        assert!(config.to_remote_config().is_err());
    }
}
