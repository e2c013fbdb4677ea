//! Liveness endpoint

use axum::response::IntoResponse;
use tracing::debug;

/// Liveness check; answers whether or not the gate is open
pub async fn health_check() -> impl IntoResponse {
    debug!("Liveness check requested");
    "Server is running"
}

/// JSON 404 for unknown routes
pub async fn not_found(uri: axum::http::Uri) -> crate::errors::RestError {
    crate::errors::RestError::not_found(uri.path())
}
