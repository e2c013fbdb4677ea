//! Server startup and shutdown logic

use anyhow::{Context, Result};
use axum::Router;
use packetsim_config::{MetricsConfig, PacketsimConfig, WorkloadConfig};
use packetsim_core::{
    AdmissionGate, HealthReporter, PacketService, ServerState, SyntheticWorkload, SysinfoSampler,
    WorkloadDefaults,
};
use packetsim_interfaces::MetricsRecorder;
use packetsim_metrics::{NoopRecorder, PrometheusRecorder};
use packetsim_resilience::ShutdownCoordinator;
use packetsim_rest_api::{create_rest_app, AppConfig, AppContext};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// Server application struct
pub struct Server {
    config: PacketsimConfig,
    state: Arc<ServerState>,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: PacketsimConfig) -> Result<Self> {
        let recorder = build_recorder(&config.metrics)?;
        let gate = AdmissionGate::with_initial_state(
            config.gate.start_open,
            config.gate.initial_reason.clone(),
        );
        let state = Arc::new(ServerState::new(gate, recorder));
        let shutdown = Arc::new(ShutdownCoordinator::with_drain_timeout(
            config.server.shutdown_timeout,
        ));

        Ok(Self {
            config,
            state,
            shutdown,
        })
    }

    /// Shared process state
    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    /// Handle used to stop the server from outside the signal handlers
    pub fn shutdown_handle(&self) -> Arc<ShutdownCoordinator> {
        self.shutdown.clone()
    }

    /// Build the complete application router
    pub fn build_app(&self) -> Router {
        let service = PacketService::new(
            self.state.clone(),
            Arc::new(SyntheticWorkload::new()),
            workload_defaults(&self.config.workload),
        )
        .with_shutdown(self.shutdown.clone());
        let reporter = HealthReporter::new(self.state.clone(), Arc::new(SysinfoSampler::new()));

        let rest_config = AppConfig {
            api_prefix: self.config.server.api_prefix.clone(),
            enable_cors: self.config.server.enable_cors,
            enable_request_id: self.config.server.enable_request_id,
            enable_tracing: self.config.server.enable_tracing,
        };

        create_rest_app(AppContext::new(service, reporter), rest_config)
    }

    /// Bind the configured address and serve until SIGINT or SIGTERM
    pub async fn start(self) -> Result<()> {
        let addr = self.config.server.socket_address();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `signal` resolves or the
    /// coordinator is triggered, then drain in-flight requests
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.build_app();
        let local_addr = listener.local_addr()?;

        self.log_config_summary();
        info!("Server listening on {}", local_addr);

        let trigger = {
            let shutdown = self.shutdown.clone();
            async move {
                tokio::select! {
                    _ = signal => {
                        shutdown.trigger();
                    }
                    _ = shutdown.wait_for_signal() => {}
                }
                info!("Shutdown signal received, starting graceful shutdown...");
            }
        };

        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(trigger)
                .await
        });

        tokio::select! {
            joined = &mut server => return finish(joined),
            _ = self.shutdown.wait_for_signal() => {}
        }

        if let Err(err) = self.shutdown.drain().await {
            warn!("{}", err);
            server.abort();
            info!("{}", self.state.telemetry.summary());
            return Ok(());
        }

        let result = finish(server.await);
        info!("{}", self.state.telemetry.summary());
        result
    }

    /// Log configuration summary
    fn log_config_summary(&self) {
        let server = &self.config.server;
        let workload = &self.config.workload;
        let enabled = |flag: bool| if flag { "Enabled" } else { "Disabled" };

        info!("=== Packetsim Server Configuration ===");
        info!("Bind Address: {}", server.socket_address());
        info!("API Prefix: {}", server.api_prefix);
        info!(
            "Gate: {} ({})",
            if self.config.gate.start_open { "Open" } else { "Closed" },
            self.config.gate.initial_reason
        );
        info!(
            "Workload Defaults: cpu={}, ram={}, min_processing_time_ms={}",
            workload.default_cpu_intensity,
            workload.default_ram_intensity,
            workload.default_min_processing_time_ms
        );
        info!(
            "Prometheus: {} (namespace {})",
            enabled(self.config.metrics.prometheus_enabled),
            self.config.metrics.namespace
        );
        info!("CORS: {}", enabled(server.enable_cors));
        info!("Request ID: {}", enabled(server.enable_request_id));
        info!("Tracing: {}", enabled(server.enable_tracing));
        info!("======================================");
    }
}

/// Metrics backend selected by configuration
pub fn build_recorder(config: &MetricsConfig) -> Result<Arc<dyn MetricsRecorder>> {
    if !config.prometheus_enabled {
        return Ok(Arc::new(NoopRecorder::new()));
    }

    let recorder = PrometheusRecorder::new(&config.namespace)
        .with_context(|| format!("Failed to register metrics under '{}'", config.namespace))?;
    Ok(Arc::new(recorder))
}

/// Fallbacks for packets that leave workload fields out
pub fn workload_defaults(config: &WorkloadConfig) -> WorkloadDefaults {
    WorkloadDefaults {
        cpu_intensity: config.default_cpu_intensity,
        ram_intensity: config.default_ram_intensity,
        min_processing_time_ms: config.default_min_processing_time_ms,
    }
}

fn finish(joined: Result<std::io::Result<()>, JoinError>) -> Result<()> {
    joined
        .context("Server task failed")?
        .context("Server error")?;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    fn quiet_config() -> PacketsimConfig {
        let mut config = PacketsimConfig::default();
        config.workload.default_min_processing_time_ms = 0;
        config
    }

    #[test]
    fn test_build_recorder_disabled() {
        let config = MetricsConfig {
            prometheus_enabled: false,
            ..MetricsConfig::default()
        };
        let recorder = build_recorder(&config).unwrap();
        assert!(recorder.export().is_none());
    }

    #[test]
    fn test_build_recorder_enabled() {
        let recorder = build_recorder(&MetricsConfig::default()).unwrap();
        assert!(recorder.export().is_some());
    }

    #[test]
    fn test_workload_defaults_follow_config() {
        let config = WorkloadConfig {
            default_cpu_intensity: 2,
            default_ram_intensity: 9,
            default_min_processing_time_ms: 250,
        };
        let defaults = workload_defaults(&config);
        assert_eq!(defaults.cpu_intensity, 2);
        assert_eq!(defaults.ram_intensity, 9);
        assert_eq!(defaults.min_processing_time_ms, 250);
    }

    #[tokio::test]
    async fn test_gate_starts_closed_when_configured() {
        let mut config = quiet_config();
        config.gate.start_open = false;
        config.gate.initial_reason = "maintenance".to_string();

        let server = Server::new(config).unwrap();
        let app = TestServer::new(server.build_app()).unwrap();

        let status: Value = app.get("/server/status").await.json();
        assert_eq!(status["isOpen"], false);
        assert_eq!(status["reason"], "maintenance");

        let response = app.post("/fakePacket").json(&serde_json::json!({})).await;
        assert_eq!(response.status_code(), 503);
    }

    #[tokio::test]
    async fn test_custom_api_prefix() {
        let mut config = quiet_config();
        config.server.api_prefix = "/v2".to_string();

        let server = Server::new(config).unwrap();
        let app = TestServer::new(server.build_app()).unwrap();

        app.get("/v2/server/status").await.assert_status_ok();
        app.get("/api/v1/server/status").await.assert_status_not_found();
    }
}
