//! In-memory recorder
//!
//! Stores everything it is given behind a single mutex. Intended for tests
//! and for inspecting a running worker without an exporter.

use packetsim_interfaces::{CounterKind, DistributionKind, GaugeKind, MetricsRecorder};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default)]
struct Recorded {
    counts: HashMap<CounterKind, u64>,
    tagged: HashMap<(CounterKind, String), u64>,
    gauges: HashMap<GaugeKind, i64>,
    gauge_history: HashMap<GaugeKind, Vec<i64>>,
    observations: HashMap<DistributionKind, Vec<f64>>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    recorded: Mutex<Recorded>,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total increments of a counter, tagged or not
    pub fn count(&self, counter: CounterKind) -> u64 {
        self.recorded.lock().counts.get(&counter).copied().unwrap_or(0)
    }

    /// Increments of a counter carrying the given tag
    pub fn tagged_count(&self, counter: CounterKind, tag: &str) -> u64 {
        self.recorded
            .lock()
            .tagged
            .get(&(counter, tag.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Last value set on a gauge
    pub fn gauge(&self, gauge: GaugeKind) -> Option<i64> {
        self.recorded.lock().gauges.get(&gauge).copied()
    }

    /// Every value a gauge has been set to, oldest first
    pub fn gauge_history(&self, gauge: GaugeKind) -> Vec<i64> {
        self.recorded
            .lock()
            .gauge_history
            .get(&gauge)
            .cloned()
            .unwrap_or_default()
    }

    /// Observed values of a distribution: seconds for latencies, bytes for sizes
    pub fn observations(&self, distribution: DistributionKind) -> Vec<f64> {
        self.recorded
            .lock()
            .observations
            .get(&distribution)
            .cloned()
            .unwrap_or_default()
    }

    pub fn reset(&self) {
        *self.recorded.lock() = Recorded::default();
    }
}

impl MetricsRecorder for InMemoryRecorder {
    fn record_count(&self, counter: CounterKind, tag: Option<&str>) {
        let mut recorded = self.recorded.lock();
        *recorded.counts.entry(counter).or_default() += 1;
        if let Some(tag) = tag {
            *recorded.tagged.entry((counter, tag.to_string())).or_default() += 1;
        }
    }

    fn record_gauge(&self, gauge: GaugeKind, value: i64) {
        let mut recorded = self.recorded.lock();
        recorded.gauges.insert(gauge, value);
        recorded.gauge_history.entry(gauge).or_default().push(value);
    }

    fn record_latency(&self, distribution: DistributionKind, elapsed: Duration) {
        self.recorded
            .lock()
            .observations
            .entry(distribution)
            .or_default()
            .push(elapsed.as_secs_f64());
    }

    fn record_size(&self, distribution: DistributionKind, bytes: u64) {
        self.recorded
            .lock()
            .observations
            .entry(distribution)
            .or_default()
            .push(bytes as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_tags() {
        let recorder = InMemoryRecorder::new();
        recorder.record_count(CounterKind::Requests, None);
        recorder.record_count(CounterKind::Errors, Some("exception"));
        recorder.record_count(CounterKind::Errors, Some("server_closed"));
        recorder.record_count(CounterKind::Errors, Some("exception"));

        assert_eq!(recorder.count(CounterKind::Requests), 1);
        assert_eq!(recorder.count(CounterKind::Errors), 3);
        assert_eq!(recorder.tagged_count(CounterKind::Errors, "exception"), 2);
        assert_eq!(recorder.tagged_count(CounterKind::Errors, "server_closed"), 1);
        assert_eq!(recorder.count(CounterKind::JobsProcessed), 0);
    }

    #[test]
    fn test_gauges_keep_history() {
        let recorder = InMemoryRecorder::new();
        assert_eq!(recorder.gauge(GaugeKind::QueueLength), None);

        recorder.record_gauge(GaugeKind::QueueLength, 1);
        recorder.record_gauge(GaugeKind::QueueLength, 2);
        recorder.record_gauge(GaugeKind::QueueLength, 1);

        assert_eq!(recorder.gauge(GaugeKind::QueueLength), Some(1));
        assert_eq!(recorder.gauge_history(GaugeKind::QueueLength), vec![1, 2, 1]);
    }

    #[test]
    fn test_observations_and_reset() {
        let recorder = InMemoryRecorder::new();
        recorder.record_latency(DistributionKind::RequestLatency, Duration::from_millis(250));
        recorder.record_size(DistributionKind::ResponseSize, 512);

        assert_eq!(recorder.observations(DistributionKind::RequestLatency), vec![0.25]);
        assert_eq!(recorder.observations(DistributionKind::ResponseSize), vec![512.0]);

        recorder.reset();
        assert!(recorder.observations(DistributionKind::RequestLatency).is_empty());
    }
}
