//! Recorder that drops every measurement

use packetsim_interfaces::{CounterKind, DistributionKind, GaugeKind, MetricsRecorder};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl NoopRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsRecorder for NoopRecorder {
    fn record_count(&self, _counter: CounterKind, _tag: Option<&str>) {}

    fn record_gauge(&self, _gauge: GaugeKind, _value: i64) {}

    fn record_latency(&self, _distribution: DistributionKind, _elapsed: Duration) {}

    fn record_size(&self, _distribution: DistributionKind, _bytes: u64) {}
}
