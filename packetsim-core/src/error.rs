//! Core error types

use packetsim_resilience::ShutdownSignal;
use thiserror::Error;

/// Result type for core operations
pub type PacketsimResult<T> = Result<T, PacketsimError>;

/// Why a packet did not complete successfully
#[derive(Error, Debug)]
pub enum PacketsimError {
    /// Admission gate is closed; no work was attempted
    #[error("Server is currently closed")]
    GateClosed,

    /// Shutdown has started; no work was attempted
    #[error("Server is shutting down")]
    ShuttingDown,

    /// Work was attempted and failed
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl PacketsimError {
    /// Tag attached to the error counter for this failure
    pub fn error_tag(&self) -> crate::telemetry::ErrorTag {
        match self {
            PacketsimError::GateClosed => crate::telemetry::ErrorTag::ServerClosed,
            PacketsimError::ShuttingDown
            | PacketsimError::Simulation(SimulationError::Interrupted(_)) => {
                crate::telemetry::ErrorTag::Shutdown
            }
            PacketsimError::Simulation(_) => crate::telemetry::ErrorTag::Exception,
        }
    }
}

/// Unexpected failure while generating load
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("unable to allocate {bytes} bytes for {structure}")]
    Allocation { structure: &'static str, bytes: usize },

    #[error("workload panicked: {0}")]
    Panicked(String),

    #[error("workload task was cancelled")]
    Cancelled,

    /// The minimum processing time could not be honored
    #[error("minimum processing time interrupted by {0} shutdown")]
    Interrupted(ShutdownSignal),
}

impl SimulationError {
    pub(crate) fn allocation<T>(structure: &'static str, count: usize) -> Self {
        SimulationError::Allocation {
            structure,
            bytes: count.saturating_mul(std::mem::size_of::<T>()),
        }
    }

    /// Convert a failed blocking task into a simulation error, keeping the
    /// panic message when there is one
    pub fn from_join(err: tokio::task::JoinError) -> Self {
        if !err.is_panic() {
            return SimulationError::Cancelled;
        }

        let payload = err.into_panic();
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };
        SimulationError::Panicked(message)
    }
}
