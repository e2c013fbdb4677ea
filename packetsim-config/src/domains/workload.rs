//! Workload defaults applied to packets that leave fields out

use crate::error::ConfigResult;
use crate::validation::{validate_range, Validatable};
use serde::{Deserialize, Serialize};

/// Lowest and highest intensity a packet can ask for
pub const MIN_INTENSITY: i64 = 1;
pub const MAX_INTENSITY: i64 = 10;

/// Workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// CPU intensity used when a packet has none
    #[serde(default = "default_intensity")]
    pub default_cpu_intensity: i64,

    /// RAM intensity used when a packet has none
    #[serde(default = "default_intensity")]
    pub default_ram_intensity: i64,

    /// Minimum processing time used when a packet has none
    #[serde(default = "default_min_processing_time_ms")]
    pub default_min_processing_time_ms: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            default_cpu_intensity: default_intensity(),
            default_ram_intensity: default_intensity(),
            default_min_processing_time_ms: default_min_processing_time_ms(),
        }
    }
}

impl Validatable for WorkloadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_range(
            self.default_cpu_intensity,
            MIN_INTENSITY,
            MAX_INTENSITY,
            "default_cpu_intensity",
            self.domain_name(),
        )?;
        validate_range(
            self.default_ram_intensity,
            MIN_INTENSITY,
            MAX_INTENSITY,
            "default_ram_intensity",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workload"
    }
}

fn default_intensity() -> i64 {
    5
}

fn default_min_processing_time_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_defaults() {
        let config = WorkloadConfig::default();
        assert_eq!(config.default_cpu_intensity, 5);
        assert_eq!(config.default_ram_intensity, 5);
        assert_eq!(config.default_min_processing_time_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_intensity_out_of_range() {
        let config = WorkloadConfig {
            default_cpu_intensity: 11,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = WorkloadConfig {
            default_ram_intensity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
