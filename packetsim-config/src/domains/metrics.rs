//! Metrics export configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Record into a Prometheus registry and serve it at `/metrics`
    #[serde(default = "crate::domains::utils::default_true")]
    pub prometheus_enabled: bool,

    /// Prefix of every exported metric name
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: true,
            namespace: default_namespace(),
        }
    }
}

impl Validatable for MetricsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.namespace, "namespace", self.domain_name())?;

        let valid = self
            .namespace
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        if !valid {
            return Err(self.validation_error(format!(
                "namespace '{}' must contain only letters, digits and underscores and not start with a digit",
                self.namespace
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "metrics"
    }
}

fn default_namespace() -> String {
    "app".to_string()
}
