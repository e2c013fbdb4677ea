//! End-to-end tests of the packet state machine against test workloads

use futures::future::join_all;
use packetsim_core::{
    AdmissionGate, Intensity, PacketRequest, PacketService, PacketStatus, ServerState,
    SimulationError, SyntheticWorkload, Workload, WorkloadDefaults, WorkloadOutcome,
    SHUTDOWN_MESSAGE,
};
use packetsim_interfaces::{CounterKind, DistributionKind, GaugeKind};
use packetsim_metrics::InMemoryRecorder;
use packetsim_resilience::ShutdownCoordinator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Records the intensities it was called with and reports them back
#[derive(Default)]
struct RecordingWorkload {
    calls: Mutex<Vec<(u8, u8)>>,
}

impl Workload for RecordingWorkload {
    fn run(&self, cpu: Intensity, ram: Intensity) -> Result<WorkloadOutcome, SimulationError> {
        self.calls.lock().push((cpu.get(), ram.get()));
        Ok(WorkloadOutcome {
            cpu_cycles: u64::from(cpu.get()) * 100,
            memory_bytes: u64::from(ram.get()) * 1000,
            checksum: 0,
        })
    }
}

struct FailingWorkload;

impl Workload for FailingWorkload {
    fn run(&self, _cpu: Intensity, _ram: Intensity) -> Result<WorkloadOutcome, SimulationError> {
        Err(SimulationError::Allocation {
            structure: "byte buffer",
            bytes: 10_000,
        })
    }
}

struct PanickingWorkload;

impl Workload for PanickingWorkload {
    fn run(&self, _cpu: Intensity, _ram: Intensity) -> Result<WorkloadOutcome, SimulationError> {
        panic!("simulated heap exhaustion")
    }
}

const FAST: WorkloadDefaults = WorkloadDefaults {
    cpu_intensity: 5,
    ram_intensity: 5,
    min_processing_time_ms: 0,
};

fn service_with(workload: Arc<dyn Workload>) -> (PacketService, Arc<ServerState>, Arc<InMemoryRecorder>) {
    let recorder = Arc::new(InMemoryRecorder::new());
    let state = Arc::new(ServerState::with_recorder(recorder.clone()));
    let service = PacketService::new(state.clone(), workload, FAST);
    (service, state, recorder)
}

fn packet(id: &str) -> PacketRequest {
    PacketRequest {
        packet_id: Some(id.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_closed_gate_rejects_without_work() {
    let workload = Arc::new(RecordingWorkload::default());
    let (service, state, recorder) = service_with(workload.clone());
    state.gate.close(Some("maintenance".into()));

    let result = service.process(packet("p1")).await;

    assert_eq!(result.status, PacketStatus::Rejected);
    assert_eq!(result.packet_id, "p1");
    assert!(result.result_message.contains("currently closed"));
    assert!(result.result_message.contains("/server/open"));
    assert!(workload.calls.lock().is_empty());
    assert_eq!(recorder.tagged_count(CounterKind::Errors, "server_closed"), 1);
    assert_eq!(recorder.count(CounterKind::JobsProcessed), 0);
    assert_eq!(recorder.count(CounterKind::Requests), 1);
    assert_eq!(recorder.count(CounterKind::Connections), 1);
}

#[tokio::test]
async fn test_small_packet_succeeds_after_minimum_latency() {
    let (service, state, recorder) = service_with(Arc::new(SyntheticWorkload::new()));
    let request: PacketRequest = serde_json::from_str(
        r#"{"packetId":"p2","cpuIntensity":1,"ramIntensity":1,"processingTimeMs":50}"#,
    )
    .unwrap();

    let started = Instant::now();
    let result = service.process(request).await;

    assert_eq!(result.status, PacketStatus::Success);
    assert_eq!(result.packet_id, "p2");
    assert!(result.processing_time_ms >= 50);
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert!(result.cpu_cycles_consumed > 0);
    assert!(result.memory_bytes_consumed > 0);
    assert_eq!(recorder.count(CounterKind::JobsProcessed), 1);
    assert_eq!(recorder.observations(DistributionKind::ProcessingTime).len(), 1);
    assert!(state.telemetry.avg_processing_time_sec() >= 0.05);
}

#[tokio::test]
async fn test_latency_floor_holds_for_trivial_work() {
    let (service, _, _) = service_with(Arc::new(RecordingWorkload::default()));

    for floor in [0i64, 1, 20, 75] {
        let request = PacketRequest {
            processing_time_ms: Some(floor),
            ..packet("floor")
        };
        let result = service.process(request).await;
        assert_eq!(result.status, PacketStatus::Success);
        assert!(result.processing_time_ms >= floor, "floor {} not met", floor);
    }
}

#[tokio::test]
async fn test_any_intensity_is_clamped_and_succeeds() {
    let workload = Arc::new(RecordingWorkload::default());
    let (service, _, _) = service_with(workload.clone());

    let inputs = [i64::MIN, -1, 0, 1, 5, 10, 11, 1_000, i64::MAX];
    for value in inputs {
        let request = PacketRequest {
            cpu_intensity: Some(value),
            ram_intensity: Some(value),
            ..packet("clamp")
        };
        assert_eq!(service.process(request).await.status, PacketStatus::Success);
    }

    let calls = workload.calls.lock().clone();
    assert_eq!(calls.len(), inputs.len());
    assert!(calls
        .iter()
        .all(|(cpu, ram)| (1..=10).contains(cpu) && (1..=10).contains(ram)));
    assert_eq!(calls[0], (1, 1));
    assert_eq!(calls[8], (10, 10));
}

#[tokio::test]
async fn test_missing_fields_use_defaults() {
    let workload = Arc::new(RecordingWorkload::default());
    let (service, _, _) = service_with(workload.clone());

    let result = service.process(PacketRequest::default()).await;

    assert_eq!(result.status, PacketStatus::Success);
    assert_eq!(workload.calls.lock().as_slice(), &[(5, 5)]);
    assert_eq!(result.cpu_cycles_consumed, 500);
    assert_eq!(result.memory_bytes_consumed, 5000);
}

#[tokio::test]
async fn test_blank_or_missing_id_is_generated() {
    let (service, state, _) = service_with(Arc::new(RecordingWorkload::default()));

    let blank = service.process(packet("")).await;
    let missing = service.process(PacketRequest::default()).await;
    assert!(!blank.packet_id.is_empty());
    assert!(!missing.packet_id.is_empty());
    assert_ne!(blank.packet_id, missing.packet_id);

    state.gate.close(None);
    let rejected = service.process(packet("  ")).await;
    assert_eq!(rejected.status, PacketStatus::Rejected);
    assert!(!rejected.packet_id.trim().is_empty());
}

#[tokio::test]
async fn test_workload_error_becomes_failed() {
    let (service, state, recorder) = service_with(Arc::new(FailingWorkload));

    let result = service.process(packet("p3")).await;

    assert_eq!(result.status, PacketStatus::Failed);
    assert_eq!(result.packet_id, "p3");
    assert!(result.result_message.starts_with("Error: "));
    assert!(result.result_message.contains("byte buffer"));
    assert_eq!(recorder.tagged_count(CounterKind::Errors, "exception"), 1);
    assert_eq!(recorder.count(CounterKind::JobsProcessed), 0);
    assert_eq!(state.telemetry.avg_processing_time_sec(), 0.0);
}

#[tokio::test]
async fn test_workload_panic_becomes_failed() {
    let (service, state, _) = service_with(Arc::new(PanickingWorkload));

    let result = service.process(packet("p4")).await;

    assert_eq!(result.status, PacketStatus::Failed);
    assert!(result.result_message.contains("simulated heap exhaustion"));
    assert_eq!(state.telemetry.summary().queue_length, 0);
    assert_eq!(state.telemetry.current_connections(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_connections_return_to_baseline_on_every_branch() {
    let workloads: Vec<Arc<dyn Workload>> = vec![
        Arc::new(RecordingWorkload::default()),
        Arc::new(FailingWorkload),
        Arc::new(PanickingWorkload),
    ];

    for workload in workloads {
        for open in [true, false] {
            let recorder = Arc::new(InMemoryRecorder::new());
            let gate = AdmissionGate::with_initial_state(open, "test");
            let state = Arc::new(ServerState::new(gate, recorder.clone()));
            let service = PacketService::new(
                state.clone(),
                workload.clone(),
                WorkloadDefaults {
                    min_processing_time_ms: 10,
                    ..FAST
                },
            );

            let before = state.telemetry.current_connections();
            let requests = (0..32).map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.process(packet(&format!("c{}", i))).await })
            });
            for result in join_all(requests).await {
                result.unwrap();
            }

            assert_eq!(state.telemetry.current_connections(), before);
            assert_eq!(state.telemetry.summary().queue_length, 0);
            assert_eq!(recorder.gauge(GaugeKind::CurrentConnections), Some(0));
            assert!(recorder
                .gauge_history(GaugeKind::CurrentConnections)
                .iter()
                .all(|value| *value >= 0));
            assert_eq!(state.telemetry.summary().total_connections, 32);
            assert_eq!(recorder.observations(DistributionKind::RequestLatency).len(), 32);
            assert_eq!(recorder.observations(DistributionKind::ResponseSize).len(), 32);
        }
    }
}

fn service_with_shutdown(
    min_processing_time_ms: u64,
) -> (
    PacketService,
    Arc<ServerState>,
    Arc<InMemoryRecorder>,
    Arc<ShutdownCoordinator>,
    Arc<RecordingWorkload>,
) {
    let recorder = Arc::new(InMemoryRecorder::new());
    let state = Arc::new(ServerState::with_recorder(recorder.clone()));
    let shutdown = Arc::new(ShutdownCoordinator::new());
    let workload = Arc::new(RecordingWorkload::default());
    let service = PacketService::new(
        state.clone(),
        workload.clone(),
        WorkloadDefaults {
            min_processing_time_ms,
            ..FAST
        },
    )
    .with_shutdown(shutdown.clone());
    (service, state, recorder, shutdown, workload)
}

#[tokio::test]
async fn test_shutdown_fails_packet_whose_latency_floor_was_cut() {
    let (service, state, recorder, shutdown, _) = service_with_shutdown(60_000);

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.process(packet("slow")).await }
    });

    while shutdown.in_flight_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("request should finish once shutdown is signalled")
        .unwrap();
    assert_eq!(result.status, PacketStatus::Failed);
    assert_eq!(
        result.result_message,
        "Error: minimum processing time interrupted by graceful shutdown"
    );
    assert!(result.processing_time_ms < 60_000);

    // A cut-short run is not a processed job and must not skew the average
    assert_eq!(state.telemetry.summary().jobs_processed, 0);
    assert_eq!(state.telemetry.avg_processing_time_sec(), 0.0);
    assert_eq!(recorder.tagged_count(CounterKind::Errors, "shutdown"), 1);
    assert_eq!(shutdown.in_flight_count(), 0);
    assert_eq!(state.telemetry.current_connections(), 0);
}

#[tokio::test]
async fn test_packets_after_shutdown_are_rejected_without_work() {
    let (service, state, recorder, shutdown, workload) = service_with_shutdown(0);
    shutdown.trigger();

    let result = service.process(packet("late")).await;

    assert_eq!(result.status, PacketStatus::Rejected);
    assert_eq!(result.packet_id, "late");
    assert_eq!(result.result_message, SHUTDOWN_MESSAGE);
    assert!(workload.calls.lock().is_empty());
    assert_eq!(state.telemetry.summary().jobs_processed, 0);
    assert_eq!(state.telemetry.summary().total_errors, 1);
    assert_eq!(recorder.tagged_count(CounterKind::Errors, "shutdown"), 1);
}

#[tokio::test]
async fn test_floor_holds_without_shutdown_signal() {
    let (service, state, _, _, _) = service_with_shutdown(40);

    let result = service.process(packet("steady")).await;

    assert_eq!(result.status, PacketStatus::Success);
    assert!(result.processing_time_ms >= 40);
    assert!(state.telemetry.avg_processing_time_sec() >= 0.04);
}

#[tokio::test]
async fn test_close_with_empty_reason_keeps_it() {
    let (_, state, _) = service_with(Arc::new(RecordingWorkload::default()));

    assert!(state.gate.close(Some(String::new())));
    let status = state.gate.status();
    assert!(!status.is_open);
    assert_eq!(status.last_change_reason, "");
}

#[tokio::test]
async fn test_response_size_matches_serialized_result() {
    let (service, _, recorder) = service_with(Arc::new(RecordingWorkload::default()));

    let result = service.process(packet("size")).await;

    let sizes = recorder.observations(DistributionKind::ResponseSize);
    assert_eq!(sizes, vec![serde_json::to_vec(&result).unwrap().len() as f64]);
}
