//! Packet request/response and gate snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Inbound fake packet
///
/// Every field is optional; defaults and clamping are applied by
/// [`crate::PacketService`], not here, so any integer is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WirePacketRequest")]
pub struct PacketRequest {
    pub packet_id: Option<String>,

    /// 1-10 scale for CPU load
    pub cpu_intensity: Option<i64>,

    /// 1-10 scale for RAM load
    pub ram_intensity: Option<i64>,

    /// Minimum processing time in milliseconds
    pub processing_time_ms: Option<i64>,

    pub payload: Option<String>,
}

/// Body as sent by clients. `id` and `minProcessingTimeMs` are older names
/// for `packetId` and `processingTimeMs`; a body may carry both spellings,
/// in which case the current name wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePacketRequest {
    #[serde(default)]
    packet_id: Option<String>,

    #[serde(default)]
    id: Option<String>,

    #[serde(default, deserialize_with = "lenient_int::deserialize")]
    cpu_intensity: Option<i64>,

    #[serde(default, deserialize_with = "lenient_int::deserialize")]
    ram_intensity: Option<i64>,

    #[serde(default, deserialize_with = "lenient_int::deserialize")]
    processing_time_ms: Option<i64>,

    #[serde(default, deserialize_with = "lenient_int::deserialize")]
    min_processing_time_ms: Option<i64>,

    #[serde(default)]
    payload: Option<String>,
}

impl From<WirePacketRequest> for PacketRequest {
    fn from(wire: WirePacketRequest) -> Self {
        Self {
            packet_id: wire.packet_id.or(wire.id),
            cpu_intensity: wire.cpu_intensity,
            ram_intensity: wire.ram_intensity,
            processing_time_ms: wire.processing_time_ms.or(wire.min_processing_time_ms),
            payload: wire.payload,
        }
    }
}

impl PacketRequest {
    /// The caller's packet id, or a fresh UUID when it is missing or blank
    pub fn resolved_packet_id(&self) -> String {
        match self.packet_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }
}

/// Accepts any JSON number for an integer field, saturating at the i64
/// bounds instead of failing on out-of-range values
mod lenient_int {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number: Option<serde_json::Number> = Option::deserialize(deserializer)?;
        Ok(number.map(|number| {
            if let Some(value) = number.as_i64() {
                value
            } else if number.as_u64().is_some() {
                i64::MAX
            } else {
                // `as` saturates for floats and maps NaN to 0
                number.as_f64().map(|value| value as i64).unwrap_or_default()
            }
        }))
    }
}

/// Final state of a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PacketStatus {
    Success,
    Rejected,
    Failed,
}

/// Outcome returned for every packet, whatever branch it took
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketResult {
    pub packet_id: String,
    pub status: PacketStatus,
    pub processing_time_ms: i64,
    pub cpu_cycles_consumed: i64,
    pub memory_bytes_consumed: i64,
    pub result_message: String,
    pub timestamp: DateTime<Utc>,
}

impl PacketResult {
    pub fn success(
        packet_id: String,
        processing_time_ms: i64,
        cpu_cycles_consumed: i64,
        memory_bytes_consumed: i64,
        result_message: impl Into<String>,
    ) -> Self {
        Self {
            packet_id,
            status: PacketStatus::Success,
            processing_time_ms,
            cpu_cycles_consumed,
            memory_bytes_consumed,
            result_message: result_message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn rejected(packet_id: String, result_message: impl Into<String>) -> Self {
        Self {
            packet_id,
            status: PacketStatus::Rejected,
            processing_time_ms: 0,
            cpu_cycles_consumed: 0,
            memory_bytes_consumed: 0,
            result_message: result_message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(packet_id: String, processing_time_ms: i64, result_message: impl Into<String>) -> Self {
        Self {
            packet_id,
            status: PacketStatus::Failed,
            processing_time_ms,
            cpu_cycles_consumed: 0,
            memory_bytes_consumed: 0,
            result_message: result_message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Size of the JSON body this result serializes to
    pub fn serialized_size(&self) -> u64 {
        serde_json::to_vec(self)
            .map(|body| body.len() as u64)
            .unwrap_or_default()
    }
}

/// Snapshot of the admission gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateState {
    pub is_open: bool,
    pub last_change_at: DateTime<Utc>,
    pub last_change_reason: String,
}

impl GateState {
    pub fn status_label(&self) -> &'static str {
        if self.is_open {
            "OPEN"
        } else {
            "CLOSED"
        }
    }
}
