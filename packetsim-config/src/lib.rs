//! Domain-driven configuration management for packetsim
//!
//! Configuration is split by functional domain (server, workload, gate,
//! logging, metrics), each with serde defaults and validation. Files may be
//! YAML or JSON; `PACKETSIM_*` environment variables override file values.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    gate::GateConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    metrics::MetricsConfig,
    server::ServerConfig,
    workload::WorkloadConfig,
    PacketsimConfig,
};

// Re-export utilities
pub use domains::utils::serde_duration;
