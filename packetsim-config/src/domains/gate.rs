//! Admission gate startup configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Whether packets are accepted as soon as the server starts
    #[serde(default = "crate::domains::utils::default_true")]
    pub start_open: bool,

    /// Reason recorded for the initial gate state
    #[serde(default = "default_initial_reason")]
    pub initial_reason: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            start_open: true,
            initial_reason: default_initial_reason(),
        }
    }
}

impl Validatable for GateConfig {
    fn validate(&self) -> ConfigResult<()> {
        // Any reason is accepted, including an empty one
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "gate"
    }
}

fn default_initial_reason() -> String {
    "Server started".to_string()
}
