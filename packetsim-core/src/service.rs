//! Request handler
//!
//! Drives one packet through `RECEIVED -> GATE_CHECK -> {REJECTED | QUEUED ->
//! PROCESSING -> {SUCCEEDED | FAILED}}` and fires the per-request metric side
//! effects on every branch. Nothing escapes [`PacketService::process`] as an
//! error: every outcome is a [`PacketResult`].

use packetsim_resilience::ShutdownCoordinator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{PacketsimError, PacketsimResult, SimulationError};
use crate::state::ServerState;
use crate::types::{PacketRequest, PacketResult};
use crate::workload::{Intensity, Workload, WorkloadOutcome};

/// Message returned with every rejected packet
pub const REJECTION_MESSAGE: &str =
    "Server is currently closed. Please open the server first using /server/open";

/// Message returned with packets that arrive after shutdown has started
pub const SHUTDOWN_MESSAGE: &str = "Server is shutting down. Please retry on another instance";

/// Values used when a request leaves a field out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadDefaults {
    pub cpu_intensity: i64,
    pub ram_intensity: i64,
    pub min_processing_time_ms: u64,
}

impl Default for WorkloadDefaults {
    fn default() -> Self {
        Self {
            cpu_intensity: 5,
            ram_intensity: 5,
            min_processing_time_ms: 1000,
        }
    }
}

/// Effective parameters for one packet after defaults and clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedParams {
    cpu: Intensity,
    ram: Intensity,
    min_processing: Duration,
}

impl WorkloadDefaults {
    fn resolve(&self, request: &PacketRequest) -> ResolvedParams {
        let cpu = Intensity::clamped(request.cpu_intensity.unwrap_or(self.cpu_intensity));
        let ram = Intensity::clamped(request.ram_intensity.unwrap_or(self.ram_intensity));
        let min_ms = match request.processing_time_ms {
            Some(ms) => u64::try_from(ms).unwrap_or(0),
            None => self.min_processing_time_ms,
        };

        ResolvedParams {
            cpu,
            ram,
            min_processing: Duration::from_millis(min_ms),
        }
    }
}

/// Packet orchestrator
#[derive(Clone)]
pub struct PacketService {
    state: Arc<ServerState>,
    workload: Arc<dyn Workload>,
    defaults: WorkloadDefaults,
    shutdown: Option<Arc<ShutdownCoordinator>>,
}

impl PacketService {
    pub fn new(state: Arc<ServerState>, workload: Arc<dyn Workload>, defaults: WorkloadDefaults) -> Self {
        Self {
            state,
            workload,
            defaults,
            shutdown: None,
        }
    }

    /// Abort minimum-latency waits and track in-flight requests through the
    /// given coordinator
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownCoordinator>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn state(&self) -> &Arc<ServerState> {
        &self.state
    }

    pub fn defaults(&self) -> WorkloadDefaults {
        self.defaults
    }

    /// Handle one packet end to end
    pub async fn process(&self, request: PacketRequest) -> PacketResult {
        let received_at = Instant::now();
        let _in_flight = self.shutdown.as_ref().map(|shutdown| shutdown.track());
        let telemetry = &self.state.telemetry;
        let _connection = telemetry.open_connection();
        telemetry.request_received();

        let packet_id = request.resolved_packet_id();
        info!("Received packet request: {}", packet_id);

        let result = match self.handle(&packet_id, &request).await {
            Ok(result) => result,
            Err(err) => {
                telemetry.request_failed(err.error_tag());
                match err {
                    PacketsimError::GateClosed => {
                        warn!("Server is CLOSED. Rejecting packet request: {}", packet_id);
                        PacketResult::rejected(packet_id, REJECTION_MESSAGE)
                    }
                    PacketsimError::ShuttingDown => {
                        warn!("Shutdown in progress. Rejecting packet request: {}", packet_id);
                        PacketResult::rejected(packet_id, SHUTDOWN_MESSAGE)
                    }
                    PacketsimError::Simulation(err) => {
                        error!("Error processing packet {}: {}", packet_id, err);
                        PacketResult::failed(
                            packet_id,
                            millis(received_at.elapsed()),
                            format!("Error: {}", err),
                        )
                    }
                }
            }
        };

        telemetry.record_response_size(result.serialized_size());
        telemetry.record_latency(received_at.elapsed());
        result
    }

    async fn handle(&self, packet_id: &str, request: &PacketRequest) -> PacketsimResult<PacketResult> {
        self.admit()?;

        let params = self.defaults.resolve(request);
        info!(
            "Processing packet {} with CPU intensity: {}, RAM intensity: {}",
            packet_id, params.cpu, params.ram
        );

        let started = Instant::now();
        let outcome = self.execute(params).await?;
        let elapsed = started.elapsed();
        self.state.telemetry.job_processed(elapsed);

        let payload_len = request.payload.as_deref().map(str::len).unwrap_or(0);
        info!("Successfully processed packet {} in {}ms", packet_id, elapsed.as_millis());

        Ok(PacketResult::success(
            packet_id.to_string(),
            millis(elapsed),
            saturating_i64(outcome.cpu_cycles),
            saturating_i64(outcome.memory_bytes),
            format!(
                "Packet processed. CPU intensity: {}, RAM intensity: {}, payload bytes: {}",
                params.cpu, params.ram, payload_len
            ),
        ))
    }

    fn admit(&self) -> PacketsimResult<()> {
        if self.shutdown.as_ref().is_some_and(|shutdown| shutdown.is_shutting_down()) {
            return Err(PacketsimError::ShuttingDown);
        }

        if self.state.gate.is_open() {
            Ok(())
        } else {
            Err(PacketsimError::GateClosed)
        }
    }

    /// Run the workload off the async executor, then hold the request until
    /// the minimum processing time has passed
    async fn execute(&self, params: ResolvedParams) -> PacketsimResult<WorkloadOutcome> {
        let _queued = self.state.telemetry.enqueue();
        let started = Instant::now();

        let workload = Arc::clone(&self.workload);
        let outcome = tokio::task::spawn_blocking(move || workload.run(params.cpu, params.ram))
            .await
            .map_err(SimulationError::from_join)??;

        let elapsed = started.elapsed();
        if let Some(remaining) = params.min_processing.checked_sub(elapsed) {
            debug!("Holding packet for {}ms to reach minimum processing time", remaining.as_millis());
            self.hold(remaining).await?;
        }

        Ok(outcome)
    }

    /// Sleep out the remaining minimum processing time. Shutdown aborts the
    /// wait, and the packet then fails since its latency floor was not met.
    async fn hold(&self, remaining: Duration) -> PacketsimResult<()> {
        let Some(shutdown) = &self.shutdown else {
            tokio::time::sleep(remaining).await;
            return Ok(());
        };

        tokio::select! {
            _ = tokio::time::sleep(remaining) => Ok(()),
            signal = shutdown.wait_for_signal() => {
                debug!("Minimum latency wait aborted by {} shutdown", signal);
                Err(SimulationError::Interrupted(signal).into())
            }
        }
    }
}

impl std::fmt::Debug for PacketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketService")
            .field("defaults", &self.defaults)
            .field("shutdown", &self.shutdown.is_some())
            .finish_non_exhaustive()
    }
}

fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
