//! HTTP server configuration

use crate::error::ConfigResult;
use crate::validation::{
    validate_port_range, validate_positive, validate_required_string, validate_route_prefix,
    Validatable,
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix under which the packet and gate routes are also mounted
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Whether to add a permissive CORS layer
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_cors: bool,

    /// Whether to tag requests with an `x-request-id` header
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_request_id: bool,

    /// Whether to trace every HTTP request
    #[serde(default = "crate::domains::utils::default_true")]
    pub enable_tracing: bool,

    /// How long in-flight requests may take to drain on shutdown
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// `bind_address:port`
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.bind_address, "bind_address", self.domain_name())?;
        if self.bind_address.parse::<IpAddr>().is_err() {
            return Err(self.validation_error(format!(
                "bind_address '{}' is not a valid IP address",
                self.bind_address
            )));
        }

        validate_port_range(self.port, "port", self.domain_name())?;
        validate_route_prefix(&self.api_prefix, "api_prefix", self.domain_name())?;
        validate_positive(self.shutdown_timeout.as_secs(), "shutdown_timeout", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}
