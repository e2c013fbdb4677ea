//! Main application configuration and router setup

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use packetsim_core::{HealthReporter, PacketService};
use packetsim_web::{cors_layer, request_id_middleware};
use tower_http::trace::TraceLayer;

use crate::{
    context::{MetricsContext, PacketsContext, ServerContext},
    handlers,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Enable CORS middleware
    pub enable_cors: bool,
    /// Enable request ID tracking
    pub enable_request_id: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Prefix under which the packet and gate routes are mounted a second time
    pub api_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            enable_request_id: true,
            enable_tracing: true,
            api_prefix: "/api/v1".to_string(),
        }
    }
}

/// Application context containing all dependencies
#[derive(Clone, Debug, FromRef)]
pub struct AppContext {
    pub packets: PacketsContext,
    pub server: ServerContext,
    pub metrics: MetricsContext,
}

impl AppContext {
    pub fn new(service: PacketService, reporter: HealthReporter) -> Self {
        let state = service.state().clone();
        Self {
            packets: PacketsContext::new(service),
            server: ServerContext::new(state.clone(), reporter),
            metrics: MetricsContext::new(state),
        }
    }
}

/// Create the complete REST API application
pub fn create_rest_app(context: AppContext, config: AppConfig) -> Router {
    let app = Router::new()
        // Load balancer and metrics endpoints (no prefix)
        .route("/server/health", get(handlers::server_health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/metrics/summary", get(handlers::metrics_summary))
        // Packet and gate routes, both bare and under the prefix
        .merge(create_api_router())
        .nest(&config.api_prefix, create_api_router())
        .fallback(handlers::not_found)
        .with_state(context);

    // Add middleware layers (applied in reverse order)
    let mut app = app;
    if config.enable_cors {
        app = app.layer(cors_layer());
    }

    if config.enable_request_id {
        app = app.layer(middleware::from_fn(request_id_middleware));
    }

    if config.enable_tracing {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

/// Packet, gate and liveness routes
fn create_api_router() -> Router<AppContext> {
    Router::new()
        .route("/fakePacket", post(handlers::process_fake_packet))
        .route("/health", get(handlers::health_check))
        .route("/server/open", post(handlers::open_server))
        .route("/server/close", post(handlers::close_server))
        .route("/server/status", get(handlers::server_status))
}
