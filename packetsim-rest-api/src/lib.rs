//! # Packetsim REST API
//!
//! HTTP surface of the packetsim worker: the fake packet endpoint, the
//! admission gate controls, the health snapshot polled by the load balancer
//! and the metrics views.
//!
//! ## Architecture
//!
//! Handlers receive narrow context structs (packets, server, metrics) split
//! out of one [`AppContext`] with `FromRef`. Every context holds handles to
//! the same `ServerState`, so the gate and counters are shared.
//!
//! ## Example
//!
//! ```rust,no_run
//! use packetsim_core::{
//!     HealthReporter, PacketService, ServerState, SyntheticWorkload, SysinfoSampler,
//!     WorkloadDefaults,
//! };
//! use packetsim_metrics::NoopRecorder;
//! use packetsim_rest_api::{create_rest_app, AppConfig, AppContext};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = Arc::new(ServerState::with_recorder(Arc::new(NoopRecorder::new())));
//! let service = PacketService::new(
//!     state.clone(),
//!     Arc::new(SyntheticWorkload::new()),
//!     WorkloadDefaults::default(),
//! );
//! let reporter = HealthReporter::new(state, Arc::new(SysinfoSampler::new()));
//!
//! let app = create_rest_app(AppContext::new(service, reporter), AppConfig::default());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod models;

// Re-export commonly used types
pub use app::{create_rest_app, AppConfig, AppContext};
pub use errors::{RestError, RestResult};
pub use models::*;
