//! Resilience patterns for packetsim
//!
//! This crate provides graceful shutdown coordination: a process-wide
//! shutdown signal that in-flight work can observe, plus in-flight tracking
//! so the server can wait for requests to drain.

pub mod shutdown;

// Re-export commonly used types
pub use shutdown::{InFlightGuard, ShutdownCoordinator, ShutdownError, ShutdownSignal};
