use chrono::{DateTime, Utc};
use packetsim_core::GateState;
use serde::{Deserialize, Serialize};

/// Gate snapshot returned by the open, close and status endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatusResponse {
    pub is_open: bool,
    /// `OPEN` or `CLOSED`
    pub status: String,
    pub last_state_change: DateTime<Utc>,
    pub reason: String,
}

impl From<GateState> for GateStatusResponse {
    fn from(state: GateState) -> Self {
        Self {
            is_open: state.is_open,
            status: state.status_label().to_string(),
            last_state_change: state.last_change_at,
            reason: state.last_change_reason,
        }
    }
}

/// `?reason=` on gate transitions. An empty value is a real reason,
/// distinct from leaving the parameter out.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReasonQuery {
    pub reason: Option<String>,
}
