//! Logging setup for packetsim
//!
//! All crates log through `tracing` macros. This crate installs the global
//! subscriber, either from a plain level string or from
//! [`packetsim_config::LoggingConfig`].

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
