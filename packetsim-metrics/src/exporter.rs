//! Prometheus recorder and text exporter

use packetsim_interfaces::{CounterKind, DistributionKind, GaugeKind, MetricsRecorder};
pub use packetsim_interfaces::PROMETHEUS_CONTENT_TYPE;
use prometheus::core::Collector;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::time::Duration;
use tracing::warn;

use crate::error::{MetricsError, MetricsResult};

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// Label carried by the error counter
const ERROR_TYPE_LABEL: &str = "type";

/// Recorder backed by its own Prometheus [`Registry`]
pub struct PrometheusRecorder {
    registry: Registry,
    requests: IntCounter,
    errors: IntCounterVec,
    connections: IntCounter,
    jobs_processed: IntCounter,
    connections_current: IntGauge,
    queue_length: IntGauge,
    request_latency: Histogram,
    processing_time: Histogram,
    response_size: Histogram,
}

impl PrometheusRecorder {
    /// Create and register every worker metric under `namespace`
    pub fn new(namespace: &str) -> MetricsResult<Self> {
        let registry = Registry::new();
        let counter = |kind: CounterKind, help: &str| {
            IntCounter::with_opts(Opts::new(kind.name(), help).namespace(namespace))
        };
        let gauge = |kind: GaugeKind, help: &str| {
            IntGauge::with_opts(Opts::new(kind.name(), help).namespace(namespace))
        };
        let histogram = |kind: DistributionKind, help: &str, buckets: Vec<f64>| {
            Histogram::with_opts(
                HistogramOpts::new(kind.name(), help)
                    .namespace(namespace)
                    .buckets(buckets),
            )
        };

        let requests = register(&registry, counter(CounterKind::Requests, "Total number of requests")?)?;
        let errors = register(
            &registry,
            IntCounterVec::new(
                Opts::new(CounterKind::Errors.name(), "Total number of errors").namespace(namespace),
                &[ERROR_TYPE_LABEL],
            )?,
        )?;
        let connections = register(
            &registry,
            counter(CounterKind::Connections, "Total number of connections")?,
        )?;
        let jobs_processed = register(
            &registry,
            counter(CounterKind::JobsProcessed, "Total number of jobs processed")?,
        )?;
        let connections_current = register(
            &registry,
            gauge(GaugeKind::CurrentConnections, "Current number of active connections")?,
        )?;
        let queue_length = register(
            &registry,
            gauge(GaugeKind::QueueLength, "Current queue length")?,
        )?;
        let request_latency = register(
            &registry,
            histogram(
                DistributionKind::RequestLatency,
                "Request latency in seconds",
                LATENCY_BUCKETS.to_vec(),
            )?,
        )?;
        let processing_time = register(
            &registry,
            histogram(
                DistributionKind::ProcessingTime,
                "Processing time in seconds",
                LATENCY_BUCKETS.to_vec(),
            )?,
        )?;
        let response_size = register(
            &registry,
            histogram(
                DistributionKind::ResponseSize,
                "Response size in bytes",
                exponential_buckets(64.0, 4.0, 8)?,
            )?,
        )?;

        Ok(Self {
            registry,
            requests,
            errors,
            connections,
            jobs_processed,
            connections_current,
            queue_length,
            request_latency,
            processing_time,
            response_size,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render the registry in the text exposition format
    pub fn render(&self) -> MetricsResult<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn histogram(&self, distribution: DistributionKind) -> &Histogram {
        match distribution {
            DistributionKind::RequestLatency => &self.request_latency,
            DistributionKind::ProcessingTime => &self.processing_time,
            DistributionKind::ResponseSize => &self.response_size,
        }
    }
}

fn register<C>(registry: &Registry, collector: C) -> MetricsResult<C>
where
    C: Collector + Clone + 'static,
{
    let name = collector
        .desc()
        .first()
        .map(|desc| desc.fq_name.clone())
        .unwrap_or_default();
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| MetricsError::Registration { name, source })?;
    Ok(collector)
}

impl MetricsRecorder for PrometheusRecorder {
    fn record_count(&self, counter: CounterKind, tag: Option<&str>) {
        match counter {
            CounterKind::Requests => self.requests.inc(),
            CounterKind::Errors => self
                .errors
                .with_label_values(&[tag.unwrap_or("unknown")])
                .inc(),
            CounterKind::Connections => self.connections.inc(),
            CounterKind::JobsProcessed => self.jobs_processed.inc(),
        }
    }

    fn record_gauge(&self, gauge: GaugeKind, value: i64) {
        match gauge {
            GaugeKind::CurrentConnections => self.connections_current.set(value),
            GaugeKind::QueueLength => self.queue_length.set(value),
        }
    }

    fn record_latency(&self, distribution: DistributionKind, elapsed: Duration) {
        self.histogram(distribution).observe(elapsed.as_secs_f64());
    }

    fn record_size(&self, distribution: DistributionKind, bytes: u64) {
        self.histogram(distribution).observe(bytes as f64);
    }

    fn export(&self) -> Option<String> {
        match self.render() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Failed to export Prometheus metrics: {}", e);
                None
            }
        }
    }
}

impl std::fmt::Debug for PrometheusRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusRecorder").finish_non_exhaustive()
    }
}
