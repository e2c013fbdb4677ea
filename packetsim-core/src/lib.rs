//! # Packetsim Core
//!
//! The worker's domain logic, independent of any HTTP framework:
//!
//! - [`AdmissionGate`]: the open/closed switch every packet is checked against
//! - [`SyntheticWorkload`]: measurable, non-eliminable CPU and RAM consumption
//! - [`PacketService`]: the per-request state machine and its metric side effects
//! - [`HealthReporter`]: the snapshot an external load balancer polls
//!
//! Process-wide mutable state lives in one explicitly owned [`ServerState`]
//! handle that is injected into the service and the reporter.

pub mod error;
pub mod gate;
pub mod health;
pub mod service;
pub mod state;
pub mod telemetry;
pub mod types;
pub mod workload;

// Re-export commonly used types
pub use error::{PacketsimError, PacketsimResult, SimulationError};
pub use gate::AdmissionGate;
pub use health::{HealthReporter, ServerHealth, SysinfoSampler};
pub use service::{PacketService, WorkloadDefaults, REJECTION_MESSAGE, SHUTDOWN_MESSAGE};
pub use state::ServerState;
pub use telemetry::{ErrorTag, LoadCounters, MetricsSummary, Telemetry};
pub use types::{GateState, PacketRequest, PacketResult, PacketStatus};
pub use workload::{Intensity, SyntheticWorkload, Workload, WorkloadOutcome};
