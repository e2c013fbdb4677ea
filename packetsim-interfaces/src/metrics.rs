//! Metrics recording interface
//!
//! A narrow, write-only surface. Backends decide how (and whether) values are
//! aggregated and exported.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content type of the Prometheus text exposition format returned by
/// [`MetricsRecorder::export`]
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Monotonic counters maintained by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Every inbound packet request
    Requests,
    /// Rejected or failed requests, tagged with the error type
    Errors,
    /// Every connection handled, matched with the connection gauge
    Connections,
    /// Packets that completed successfully
    JobsProcessed,
}

impl CounterKind {
    pub fn name(&self) -> &'static str {
        match self {
            CounterKind::Requests => "requests_total",
            CounterKind::Errors => "errors_total",
            CounterKind::Connections => "connections_total",
            CounterKind::JobsProcessed => "jobs_processed_total",
        }
    }
}

/// Point-in-time gauges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GaugeKind {
    CurrentConnections,
    QueueLength,
}

impl GaugeKind {
    pub fn name(&self) -> &'static str {
        match self {
            GaugeKind::CurrentConnections => "connections_current",
            GaugeKind::QueueLength => "queue_length",
        }
    }
}

/// Distributions recorded as histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    /// Wall-clock time of the whole request, in seconds
    RequestLatency,
    /// Time spent processing a successful packet, in seconds
    ProcessingTime,
    /// Serialized response body size, in bytes
    ResponseSize,
}

impl DistributionKind {
    pub fn name(&self) -> &'static str {
        match self {
            DistributionKind::RequestLatency => "request_latency_seconds",
            DistributionKind::ProcessingTime => "processing_time_seconds",
            DistributionKind::ResponseSize => "response_size_bytes",
        }
    }
}

/// Write-only metrics sink
///
/// Implementations must be cheap and non-blocking: they are called on every
/// request path, including the rejection path.
pub trait MetricsRecorder: Send + Sync {
    /// Increment a counter by one. `tag` distinguishes sub-types such as
    /// the error reason.
    fn record_count(&self, counter: CounterKind, tag: Option<&str>);

    /// Publish the current value of a gauge
    fn record_gauge(&self, gauge: GaugeKind, value: i64);

    /// Record a duration into a time distribution
    fn record_latency(&self, distribution: DistributionKind, elapsed: Duration);

    /// Record a size into a byte distribution
    fn record_size(&self, distribution: DistributionKind, bytes: u64);

    /// Render the backend's current state in an exportable text format.
    /// Backends without an export format return `None`.
    fn export(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_unique() {
        let names = [
            CounterKind::Requests.name(),
            CounterKind::Errors.name(),
            CounterKind::Connections.name(),
            CounterKind::JobsProcessed.name(),
            GaugeKind::CurrentConnections.name(),
            GaugeKind::QueueLength.name(),
            DistributionKind::RequestLatency.name(),
            DistributionKind::ProcessingTime.name(),
            DistributionKind::ResponseSize.name(),
        ];
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
