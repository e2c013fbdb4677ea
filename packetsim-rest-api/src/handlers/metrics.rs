//! Metrics views

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use packetsim_interfaces::PROMETHEUS_CONTENT_TYPE;
use tracing::info;

use crate::context::MetricsContext;

/// `GET /metrics/summary`: one human-readable line of load counters
pub async fn metrics_summary(State(ctx): State<MetricsContext>) -> impl IntoResponse {
    let summary = ctx.state.telemetry.summary();
    info!("{}", summary);
    summary.to_string()
}

/// `GET /metrics`: Prometheus text exposition, empty when export is disabled
pub async fn prometheus_metrics(State(ctx): State<MetricsContext>) -> impl IntoResponse {
    let body = ctx.state.telemetry.recorder().export().unwrap_or_default();
    ([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body)
}
