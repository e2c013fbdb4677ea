//! Domain-specific configuration modules

pub mod gate;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod utils;
pub mod workload;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main packetsim configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PacketsimConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: server::ServerConfig,

    /// Defaults for packets that leave workload fields out
    #[serde(default)]
    pub workload: workload::WorkloadConfig,

    /// Admission gate startup state
    #[serde(default)]
    pub gate: gate::GateConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Metrics export configuration
    #[serde(default)]
    pub metrics: metrics::MetricsConfig,
}

impl PacketsimConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.workload.validate()?;
        self.gate.validate()?;
        self.logging.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = PacketsimConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
