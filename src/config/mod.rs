//! Configuration module for the CRM server

use crate::core::error::ConfigError;
use crate::core::query::{DEFAULT_LIMIT, MAX_LIMIT};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete configuration
///
/// ```yaml
/// server:
///   host: 127.0.0.1
///   port: 3000
///   cors: true
/// storage:
///   saved_filters_path: data/filters.json
///   seed_path: data/seed.json
/// query:
///   default_limit: 20
///   max_limit: 100
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub query: QueryConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allow cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: true,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string to bind to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where persistent data lives
///
/// Without `saved_filters_path` saved filters only live in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub saved_filters_path: Option<PathBuf>,
    pub seed_path: Option<PathBuf>,
}

/// Pagination limits for list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl CrmConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                file: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_yaml_file(path)
        } else {
            tracing::info!(path = %path.display(), "No config file found, using defaults");
            Ok(Self::default_config())
        }
    }

    /// Built-in configuration used when no file is given
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.query.max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "query.max_limit".to_string(),
                value: self.query.max_limit.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.query.default_limit == 0 || self.query.default_limit > self.query.max_limit {
            return Err(ConfigError::InvalidValue {
                field: "query.default_limit".to_string(),
                value: self.query.default_limit.to_string(),
                message: format!("must be between 1 and {}", self.query.max_limit),
            });
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.host".to_string(),
                value: self.server.host.clone(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
