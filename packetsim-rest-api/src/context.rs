//! Context types for dependency injection in REST API handlers
//!
//! Each endpoint group gets the smallest set of handles it needs.

use packetsim_core::{HealthReporter, PacketService, ServerState};
use std::sync::Arc;

/// Context for the fake packet endpoint
#[derive(Clone, Debug)]
pub struct PacketsContext {
    pub service: PacketService,
}

impl PacketsContext {
    pub fn new(service: PacketService) -> Self {
        Self { service }
    }
}

/// Context for the gate and health endpoints
///
/// Health reporting never consults the gate for admission, so the load
/// balancer can poll while the server is closed.
#[derive(Clone, Debug)]
pub struct ServerContext {
    pub state: Arc<ServerState>,
    pub reporter: HealthReporter,
}

impl ServerContext {
    pub fn new(state: Arc<ServerState>, reporter: HealthReporter) -> Self {
        Self { state, reporter }
    }
}

/// Context for the metrics views
#[derive(Clone, Debug)]
pub struct MetricsContext {
    pub state: Arc<ServerState>,
}

impl MetricsContext {
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state }
    }
}
