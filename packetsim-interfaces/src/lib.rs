//! # Packetsim Interfaces
//!
//! Core interfaces shared across the packetsim workspace.
//!
//! The worker core never talks to a metrics library or the operating system
//! directly. It writes measurements through [`MetricsRecorder`] and reads
//! host utilization through [`ResourceSampler`], so tests can swap in
//! in-memory doubles and the server can wire real backends.
//!
//! ## Main Interfaces
//!
//! - [`MetricsRecorder`] - write-only recording of counters, gauges and distributions
//! - [`ResourceSampler`] - point-in-time CPU and memory utilization of the host process

pub mod metrics;
pub mod resources;

// Re-export commonly used types
pub use metrics::{
    CounterKind, DistributionKind, GaugeKind, MetricsRecorder, PROMETHEUS_CONTENT_TYPE,
};
pub use resources::{ResourceSampler, ResourceUsage};
