//! TOML configuration file loading
//!
//! An explicitly named file must exist. Without one, the default file under
//! the user configuration directory is used if present, otherwise defaults.

use crate::service::api::ServiceSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// `[log]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
    pub color: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub broker_addrs: Vec<String>,
    pub registry_addr: String,
    pub partitions: u32,
    pub replications: u32,
    pub state_file: Option<PathBuf>,
    pub log: LogConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            broker_addrs: vec!["localhost:9092".to_string()],
            registry_addr: "localhost:2181".to_string(),
            partitions: 16,
            replications: 2,
            state_file: None,
            log: LogConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// `<config_dir>/Queuegate/queuegate.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Queuegate").join("queuegate.toml"))
    }

    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_toml_str(&contents, path)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve the configuration to use and the file it came from
    pub async fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Missing {
                        path: path.to_path_buf(),
                    });
                }
                Ok((Self::load(path).await?, Some(path.to_path_buf())))
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    let config = Self::load(&path).await?;
                    Ok((config, Some(path)))
                }
                _ => Ok((Self::default(), None)),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.partitions < 1 {
            return Err(ConfigError::Invalid(
                "partitions must be at least 1".to_string(),
            ));
        }
        if self.replications < 1 {
            return Err(ConfigError::Invalid(
                "replications must be at least 1".to_string(),
            ));
        }
        if self.broker_addrs.is_empty() {
            return Err(ConfigError::Invalid(
                "broker_addrs must name at least one broker".to_string(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> ServiceSettings {
        ServiceSettings {
            broker_addrs: self.broker_addrs.clone(),
            registry_addr: self.registry_addr.clone(),
            partitions: self.partitions,
            replications: self.replications,
        }
    }
}
