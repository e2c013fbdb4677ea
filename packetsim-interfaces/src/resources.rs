//! Host resource sampling interface

use serde::{Deserialize, Serialize};

/// Utilization snapshot, both values in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

impl ResourceUsage {
    /// Clamp into `[0, 100]` and round to two decimals. Non-finite readings
    /// (an unavailable reading) become 0.
    pub fn normalized(self) -> Self {
        Self {
            cpu_percent: normalize_percent(self.cpu_percent),
            memory_percent: normalize_percent(self.memory_percent),
        }
    }
}

fn normalize_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Samples the current process's resource utilization
pub trait ResourceSampler: Send + Sync {
    fn sample(&self) -> ResourceUsage;
}
