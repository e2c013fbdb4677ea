//! Workload simulator
//!
//! Burns CPU and RAM in proportion to a 1-10 intensity dial. The numbers it
//! reports are load indicators, not exact measurements: `cpu_cycles` counts
//! units of work done, `memory_bytes` estimates what was held at peak.
//!
//! Every generated value is folded into a checksum that goes through
//! [`std::hint::black_box`], so the optimizer cannot drop the work.

use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::hint::black_box;
use tracing::debug;
use uuid::Uuid;

use crate::error::SimulationError;

/// Intensity clamped to `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamp any integer into the valid range
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn scale(self, unit: usize) -> usize {
        usize::from(self.0) * unit
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Totals reported by one simulation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkloadOutcome {
    pub cpu_cycles: u64,
    pub memory_bytes: u64,
    pub checksum: u64,
}

/// Something that consumes resources on behalf of a packet.
///
/// Implementations are synchronous and CPU bound; callers run them on a
/// blocking thread.
pub trait Workload: Send + Sync + 'static {
    fn run(&self, cpu: Intensity, ram: Intensity) -> Result<WorkloadOutcome, SimulationError>;
}

/// The production workload: primes, SHA-256, transcendental math and string
/// churn for CPU; lists, nested maps, random buffers and record maps for RAM.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticWorkload;

impl SyntheticWorkload {
    pub fn new() -> Self {
        Self
    }

    /// CPU phase. Returns (cycles, checksum).
    pub fn burn_cpu(&self, intensity: Intensity) -> (u64, u64) {
        let mut cycles = 0u64;
        let mut checksum = 0u64;

        // Prime search
        let limit = intensity.scale(100_000) as u64;
        let mut primes = Vec::new();
        for candidate in 2..limit {
            if is_prime(candidate) {
                primes.push(candidate);
                cycles += 1;
            }
        }
        checksum ^= primes.iter().fold(0u64, |acc, p| acc.wrapping_add(*p));

        // Hashing
        for _ in 0..intensity.scale(1_000) {
            let digest = Sha256::digest(Uuid::new_v4().to_string().as_bytes());
            cycles += digest.len() as u64;
            checksum = digest
                .iter()
                .take(8)
                .fold(checksum, |acc, byte| acc.rotate_left(8) ^ u64::from(*byte));
        }

        // Transcendental math
        let mut accumulator = 0.0f64;
        for i in 0..intensity.scale(50_000) {
            let x = i as f64;
            accumulator += x.sqrt() * (x + 1.0).ln() / (x * 0.1).cos();
            cycles += 1;
        }
        checksum ^= black_box(accumulator).to_bits();

        // String churn with a bounded buffer
        let mut buffer = String::new();
        for _ in 0..intensity.scale(10_000) {
            buffer.push_str(&Uuid::new_v4().to_string());
            if buffer.len() > 100_000 {
                let cut = buffer.len() - 1_000;
                buffer.drain(..cut);
            }
            cycles += 1;
        }
        checksum = checksum.wrapping_add(buffer.len() as u64);

        debug!(
            "CPU work completed: {} cycles, {} primes found",
            cycles,
            primes.len()
        );
        (cycles, black_box(checksum))
    }

    /// RAM phase. Everything allocated here is dropped before returning.
    /// Returns (approximate bytes, checksum).
    pub fn fill_memory(&self, intensity: Intensity) -> Result<(u64, u64), SimulationError> {
        let mut total = 0u64;
        let mut checksum = 0u64;

        // Large list of strings
        let list_len = intensity.scale(100_000);
        let mut strings: Vec<String> = Vec::new();
        strings
            .try_reserve_exact(list_len)
            .map_err(|_| SimulationError::allocation::<String>("string list", list_len))?;
        for i in 0..list_len {
            strings.push(format!("{}-{}", Uuid::new_v4(), i));
        }
        total += strings
            .iter()
            .map(|s| (s.capacity() + std::mem::size_of::<String>()) as u64)
            .sum::<u64>();

        // Map of small nested maps
        let map_len = intensity.scale(10_000);
        let mut nested: HashMap<String, HashMap<&'static str, String>> = HashMap::new();
        nested
            .try_reserve(map_len)
            .map_err(|_| SimulationError::allocation::<(String, HashMap<&str, String>)>("nested map", map_len))?;
        for i in 0..map_len {
            let mut inner = HashMap::with_capacity(3);
            inner.insert("key1", Uuid::new_v4().to_string());
            inner.insert("key2", Uuid::new_v4().to_string());
            inner.insert("key3", Uuid::new_v4().to_string());
            nested.insert(format!("entry-{}", i), inner);
        }
        total += nested.len() as u64 * 200;

        // Random byte buffers
        let mut rng = rand::rng();
        let buffer_count = intensity.scale(100);
        let mut buffers: Vec<Vec<u8>> = Vec::new();
        buffers
            .try_reserve_exact(buffer_count)
            .map_err(|_| SimulationError::allocation::<Vec<u8>>("buffer list", buffer_count))?;
        for _ in 0..buffer_count {
            let mut buffer = zeroed_bytes(BUFFER_SIZE, "byte buffer")?;
            rng.fill_bytes(&mut buffer);
            total += buffer.len() as u64;
            buffers.push(buffer);
        }

        // Map of record lists
        let record_keys = intensity.scale(1_000);
        let mut records: HashMap<String, Vec<Record>> = HashMap::new();
        records
            .try_reserve(record_keys)
            .map_err(|_| SimulationError::allocation::<Vec<Record>>("record map", record_keys))?;
        for i in 0..record_keys {
            let mut list = Vec::new();
            list.try_reserve_exact(RECORDS_PER_KEY)
                .map_err(|_| SimulationError::allocation::<Record>("record list", RECORDS_PER_KEY))?;
            for j in 0..RECORDS_PER_KEY {
                list.push(Record {
                    id: Uuid::new_v4().to_string(),
                    timestamp_ms: chrono::Utc::now().timestamp_millis(),
                    data: zeroed_bytes(RECORD_DATA_SIZE, "record data")?,
                    index: i * RECORDS_PER_KEY + j,
                });
            }
            records.insert(format!("key-{}", i), list);
        }
        total += records.len() as u64 * 12_000;

        // Touch the data so none of it is dead
        checksum = strings
            .iter()
            .fold(checksum, |acc, s| acc.wrapping_add(fold_bytes(s.as_bytes())));
        checksum = nested.values().fold(checksum, |acc, inner| {
            inner
                .values()
                .fold(acc, |acc, value| acc ^ fold_bytes(value.as_bytes()))
        });
        checksum = buffers
            .iter()
            .fold(checksum, |acc, buffer| acc.wrapping_add(u64::from(buffer[0])));
        checksum = records.values().flatten().fold(checksum, |acc, record| {
            acc.wrapping_add(record.index as u64)
                .wrapping_add(record.timestamp_ms as u64)
                .wrapping_add(record.id.len() as u64 + record.data.len() as u64)
        });

        debug!(
            "RAM work completed: {} bytes allocated, checksum: {}",
            total, checksum
        );
        Ok((total, black_box(checksum)))
    }
}

impl Workload for SyntheticWorkload {
    fn run(&self, cpu: Intensity, ram: Intensity) -> Result<WorkloadOutcome, SimulationError> {
        let (cpu_cycles, cpu_checksum) = self.burn_cpu(cpu);
        let (memory_bytes, ram_checksum) = self.fill_memory(ram)?;

        Ok(WorkloadOutcome {
            cpu_cycles,
            memory_bytes,
            checksum: cpu_checksum ^ ram_checksum,
        })
    }
}

/// Zero-filled byte vector whose allocation failure is reported instead of
/// aborting the process
fn zeroed_bytes(len: usize, structure: &'static str) -> Result<Vec<u8>, SimulationError> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| SimulationError::allocation::<u8>(structure, len))?;
    bytes.resize(len, 0u8);
    Ok(bytes)
}

const BUFFER_SIZE: usize = 10_000;
const RECORDS_PER_KEY: usize = 10;
const RECORD_DATA_SIZE: usize = 1_000;

struct Record {
    id: String,
    timestamp_ms: i64,
    data: Vec<u8>,
    index: usize,
}

fn fold_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(*byte)))
}

fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut i = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}
