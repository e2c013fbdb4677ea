//! Process-wide shared state

use std::sync::Arc;

use packetsim_interfaces::MetricsRecorder;

use crate::gate::AdmissionGate;
use crate::telemetry::Telemetry;

/// Everything that is shared across requests. Built once at startup and
/// handed out as `Arc<ServerState>`.
#[derive(Debug)]
pub struct ServerState {
    pub gate: AdmissionGate,
    pub telemetry: Telemetry,
}

impl ServerState {
    pub fn new(gate: AdmissionGate, recorder: Arc<dyn MetricsRecorder>) -> Self {
        Self {
            gate,
            telemetry: Telemetry::new(recorder),
        }
    }

    /// Open gate, recorder of choice
    pub fn with_recorder(recorder: Arc<dyn MetricsRecorder>) -> Self {
        Self::new(AdmissionGate::new(), recorder)
    }
}
