//! Load counters and metric emission
//!
//! [`Telemetry`] owns the in-process counters that back the health report
//! and the summary line, and forwards every event to the injected
//! [`MetricsRecorder`]. Gauges are maintained through guards so they return
//! to their previous value on every exit path.

use packetsim_interfaces::{CounterKind, DistributionKind, GaugeKind, MetricsRecorder};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tag attached to the error counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTag {
    ServerClosed,
    Shutdown,
    Exception,
}

impl ErrorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorTag::ServerClosed => "server_closed",
            ErrorTag::Shutdown => "shutdown",
            ErrorTag::Exception => "exception",
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw counters kept in process
#[derive(Debug, Default)]
pub struct LoadCounters {
    current_connections: AtomicI64,
    queue_length: AtomicI64,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_connections: AtomicU64,
    jobs_processed: AtomicU64,
}

impl LoadCounters {
    pub fn current_connections(&self) -> i64 {
        self.current_connections.load(Ordering::Acquire)
    }

    pub fn queue_length(&self) -> i64 {
        self.queue_length.load(Ordering::Acquire)
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn total_errors(&self) -> u64 {
        self.total_errors.load(Ordering::Relaxed)
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn jobs_processed(&self) -> u64 {
        self.jobs_processed.load(Ordering::Relaxed)
    }
}

/// Running mean of successful processing times, in seconds
#[derive(Debug, Default)]
struct ProcessingAverage {
    count: u64,
    average_sec: f64,
}

impl ProcessingAverage {
    fn observe(&mut self, elapsed: Duration) {
        self.count += 1;
        self.average_sec += (elapsed.as_secs_f64() - self.average_sec) / self.count as f64;
    }
}

/// Counter snapshot with the one-line summary format used in logs and at
/// `GET /metrics/summary`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_connections: u64,
    pub jobs_processed: u64,
    pub current_connections: i64,
    pub queue_length: i64,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Metrics Summary - Total Requests: {}, Total Errors: {}, Total Connections: {}, \
             Jobs Processed: {}, Current Connections: {}, Queue Length: {}",
            self.total_requests,
            self.total_errors,
            self.total_connections,
            self.jobs_processed,
            self.current_connections,
            self.queue_length
        )
    }
}

/// Counters plus the recorder they are mirrored to
pub struct Telemetry {
    counters: Arc<LoadCounters>,
    processing: Mutex<ProcessingAverage>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl Telemetry {
    pub fn new(recorder: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            counters: Arc::new(LoadCounters::default()),
            processing: Mutex::new(ProcessingAverage::default()),
            recorder,
        }
    }

    pub fn counters(&self) -> &LoadCounters {
        &self.counters
    }

    pub fn recorder(&self) -> &Arc<dyn MetricsRecorder> {
        &self.recorder
    }

    /// Count a new connection; the gauge drops back when the guard is dropped
    pub fn open_connection(&self) -> ConnectionGuard {
        self.counters.total_connections.fetch_add(1, Ordering::Relaxed);
        self.recorder.record_count(CounterKind::Connections, None);
        let current = self.counters.current_connections.fetch_add(1, Ordering::AcqRel) + 1;
        self.recorder.record_gauge(GaugeKind::CurrentConnections, current);

        ConnectionGuard {
            counters: Arc::clone(&self.counters),
            recorder: Arc::clone(&self.recorder),
        }
    }

    pub fn request_received(&self) {
        self.counters.total_requests.fetch_add(1, Ordering::Relaxed);
        self.recorder.record_count(CounterKind::Requests, None);
    }

    /// Mark a job as queued for execution until the guard is dropped
    pub fn enqueue(&self) -> QueueGuard {
        let length = self.counters.queue_length.fetch_add(1, Ordering::AcqRel) + 1;
        self.recorder.record_gauge(GaugeKind::QueueLength, length);

        QueueGuard {
            counters: Arc::clone(&self.counters),
            recorder: Arc::clone(&self.recorder),
        }
    }

    pub fn request_failed(&self, tag: ErrorTag) {
        self.counters.total_errors.fetch_add(1, Ordering::Relaxed);
        self.recorder.record_count(CounterKind::Errors, Some(tag.as_str()));
    }

    /// Record a successful job and fold its duration into the running mean
    pub fn job_processed(&self, elapsed: Duration) {
        self.counters.jobs_processed.fetch_add(1, Ordering::Relaxed);
        self.recorder.record_count(CounterKind::JobsProcessed, None);
        self.recorder
            .record_latency(DistributionKind::ProcessingTime, elapsed);
        self.processing.lock().observe(elapsed);
    }

    pub fn record_latency(&self, elapsed: Duration) {
        self.recorder
            .record_latency(DistributionKind::RequestLatency, elapsed);
    }

    pub fn record_response_size(&self, bytes: u64) {
        self.recorder.record_size(DistributionKind::ResponseSize, bytes);
    }

    pub fn current_connections(&self) -> i64 {
        self.counters.current_connections()
    }

    pub fn avg_processing_time_sec(&self) -> f64 {
        self.processing.lock().average_sec
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_requests: self.counters.total_requests(),
            total_errors: self.counters.total_errors(),
            total_connections: self.counters.total_connections(),
            jobs_processed: self.counters.jobs_processed(),
            current_connections: self.counters.current_connections(),
            queue_length: self.counters.queue_length(),
        }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("counters", &self.counters)
            .field("processing", &*self.processing.lock())
            .finish_non_exhaustive()
    }
}

/// Decrements the connection gauge on drop
#[must_use = "the connection is closed as soon as the guard is dropped"]
pub struct ConnectionGuard {
    counters: Arc<LoadCounters>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let current = self.counters.current_connections.fetch_sub(1, Ordering::AcqRel) - 1;
        self.recorder.record_gauge(GaugeKind::CurrentConnections, current);
    }
}

/// Decrements the queue gauge on drop
#[must_use = "the job leaves the queue as soon as the guard is dropped"]
pub struct QueueGuard {
    counters: Arc<LoadCounters>,
    recorder: Arc<dyn MetricsRecorder>,
}

impl Drop for QueueGuard {
    fn drop(&mut self) {
        let length = self.counters.queue_length.fetch_sub(1, Ordering::AcqRel) - 1;
        self.recorder.record_gauge(GaugeKind::QueueLength, length);
    }
}
