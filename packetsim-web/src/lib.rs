//! # Packetsim Web Utilities
//!
//! Middleware shared by the packetsim HTTP API:
//!
//! - **Request IDs**: every request gets an `x-request-id` (taken from the
//!   caller when present) that is echoed back and attached to a tracing span
//! - **CORS**: a layer open to the dashboards and load balancers that poll
//!   the worker
//!
//! ## Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use packetsim_web::{cors_layer, request_id_middleware};
//!
//! let app: Router = Router::new()
//!     .route("/health", get(|| async { "Server is running" }))
//!     .layer(middleware::from_fn(request_id_middleware))
//!     .layer(cors_layer());
//! ```

pub mod middleware;

// Re-export commonly used types and functions
pub use middleware::{
    cors_layer, cors_layer_with_config, request_id_middleware, CorsConfig, RequestId,
    REQUEST_ID_HEADER,
};
