//! Health reporting for the external load balancer

use packetsim_interfaces::{ResourceSampler, ResourceUsage};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use crate::state::ServerState;

/// Snapshot polled by the load balancer. Field names are a fixed contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerHealth {
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    pub avg_processing_time_sec: f64,
    pub curr_connections: i64,
    pub is_open: bool,
}

/// Builds [`ServerHealth`] from live state. Never consults the gate for
/// admission, only for its current value.
#[derive(Clone)]
pub struct HealthReporter {
    state: Arc<ServerState>,
    sampler: Arc<dyn ResourceSampler>,
}

impl HealthReporter {
    pub fn new(state: Arc<ServerState>, sampler: Arc<dyn ResourceSampler>) -> Self {
        Self { state, sampler }
    }

    pub fn report(&self) -> ServerHealth {
        let usage = self.sampler.sample().normalized();
        let health = ServerHealth {
            cpu_usage_percent: usage.cpu_percent,
            memory_usage_percent: usage.memory_percent,
            avg_processing_time_sec: self.state.telemetry.avg_processing_time_sec(),
            curr_connections: self.state.telemetry.current_connections().max(0),
            is_open: self.state.gate.is_open(),
        };

        debug!(
            "Health check response: CPU={}%, Memory={}%, Connections={}, Open={}",
            health.cpu_usage_percent,
            health.memory_usage_percent,
            health.curr_connections,
            health.is_open
        );
        health
    }
}

impl std::fmt::Debug for HealthReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthReporter").finish_non_exhaustive()
    }
}

/// Samples this process through `sysinfo`.
///
/// CPU is the process's usage since the previous sample divided by the
/// number of logical cores; memory is resident size over total host memory.
/// The first CPU reading is 0.
pub struct SysinfoSampler {
    system: Mutex<System>,
    pid: Option<Pid>,
    cpu_count: usize,
}

impl SysinfoSampler {
    pub fn new() -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let cpu_count = std::thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(1);

        Self {
            system: Mutex::new(System::new()),
            pid,
            cpu_count,
        }
    }
}

impl Default for SysinfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for SysinfoSampler {
    fn sample(&self) -> ResourceUsage {
        let Some(pid) = self.pid else {
            return ResourceUsage::default();
        };

        let mut system = self.system.lock();
        system.refresh_memory();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let total_memory = system.total_memory();
        match system.process(pid) {
            Some(process) => ResourceUsage {
                cpu_percent: f64::from(process.cpu_usage()) / self.cpu_count as f64,
                memory_percent: if total_memory == 0 {
                    0.0
                } else {
                    process.memory() as f64 / total_memory as f64 * 100.0
                },
            },
            None => ResourceUsage::default(),
        }
    }
}

impl std::fmt::Debug for SysinfoSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SysinfoSampler")
            .field("pid", &self.pid)
            .field("cpu_count", &self.cpu_count)
            .finish()
    }
}
