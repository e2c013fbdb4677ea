//! # Packetsim Metrics
//!
//! Backends for [`packetsim_interfaces::MetricsRecorder`]:
//!
//! - [`PrometheusRecorder`] - registers counters, gauges and histograms in a
//!   Prometheus registry and renders the text exposition format
//! - [`InMemoryRecorder`] - keeps every recorded value so tests can query it
//! - [`NoopRecorder`] - discards everything

pub mod error;
pub mod exporter;
pub mod memory;
pub mod noop;

pub use error::{MetricsError, MetricsResult};
pub use exporter::{PrometheusRecorder, PROMETHEUS_CONTENT_TYPE};
pub use memory::InMemoryRecorder;
pub use noop::NoopRecorder;
