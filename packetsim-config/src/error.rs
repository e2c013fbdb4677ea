//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a worker configuration could not be produced
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A `PACKETSIM_*` override that does not parse
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Env {
        var: String,
        value: String,
        reason: String,
    },

    /// A domain that failed validation
    #[error("Invalid {domain} configuration: {message}")]
    Invalid { domain: String, message: String },
}

impl ConfigError {
    /// Domain that failed validation, if that is what went wrong
    pub fn domain(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { domain, .. } => Some(domain),
            _ => None,
        }
    }
}
