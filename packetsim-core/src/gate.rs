//! Admission gate
//!
//! The open flag is an atomic so the per-request check never takes a lock.
//! Transitions and the audit record (timestamp + reason) are serialized by a
//! short mutex section, and the flag is only flipped while that mutex is held,
//! so a status snapshot is always internally consistent.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::types::GateState;

pub const DEFAULT_OPEN_REASON: &str = "Server opened";
pub const DEFAULT_CLOSE_REASON: &str = "Server closed";
pub const STARTUP_REASON: &str = "Server started";

#[derive(Debug)]
struct GateAudit {
    changed_at: DateTime<Utc>,
    reason: String,
}

/// Open/closed switch controlling whether new packets are accepted
#[derive(Debug)]
pub struct AdmissionGate {
    open: AtomicBool,
    audit: Mutex<GateAudit>,
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionGate {
    /// A gate that starts open with reason "Server started"
    pub fn new() -> Self {
        Self::with_initial_state(true, STARTUP_REASON)
    }

    pub fn with_initial_state(open: bool, reason: impl Into<String>) -> Self {
        Self {
            open: AtomicBool::new(open),
            audit: Mutex::new(GateAudit {
                changed_at: Utc::now(),
                reason: reason.into(),
            }),
        }
    }

    /// Lock-free admission check
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Open the gate. Returns false (and changes nothing) if it was already open.
    pub fn open(&self, reason: Option<String>) -> bool {
        let changed = self.transition(true, reason, DEFAULT_OPEN_REASON);
        if changed {
            let status = self.status();
            info!(
                "Server OPENED at {}: {}",
                status.last_change_at, status.last_change_reason
            );
        } else {
            warn!("Attempt to open server, but it's already open");
        }
        changed
    }

    /// Close the gate. Returns false (and changes nothing) if it was already closed.
    pub fn close(&self, reason: Option<String>) -> bool {
        let changed = self.transition(false, reason, DEFAULT_CLOSE_REASON);
        if changed {
            let status = self.status();
            warn!(
                "Server CLOSED at {}: {}",
                status.last_change_at, status.last_change_reason
            );
        } else {
            warn!("Attempt to close server, but it's already closed");
        }
        changed
    }

    /// Consistent snapshot of flag, timestamp and reason
    pub fn status(&self) -> GateState {
        let audit = self.audit.lock();
        GateState {
            is_open: self.open.load(Ordering::Acquire),
            last_change_at: audit.changed_at,
            last_change_reason: audit.reason.clone(),
        }
    }

    fn transition(&self, target: bool, reason: Option<String>, default_reason: &str) -> bool {
        let mut audit = self.audit.lock();
        if self.open.load(Ordering::Acquire) == target {
            return false;
        }

        audit.changed_at = Utc::now();
        audit.reason = reason.unwrap_or_else(|| default_reason.to_string());
        self.open.store(target, Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_gate_starts_open() {
        let gate = AdmissionGate::default();
        assert!(gate.is_open());
        assert_eq!(gate.status().last_change_reason, STARTUP_REASON);
    }

    #[test]
    fn test_initial_state() {
        let gate = AdmissionGate::new();
        let status = gate.status();
        assert!(gate.is_open());
        assert!(status.is_open);
        assert_eq!(status.last_change_reason, "Server started");
    }

    #[test]
    fn test_close_then_open_with_default_reasons() {
        let gate = AdmissionGate::new();

        assert!(gate.close(None));
        assert!(!gate.is_open());
        assert_eq!(gate.status().last_change_reason, "Server closed");

        assert!(gate.open(None));
        assert!(gate.is_open());
        assert_eq!(gate.status().last_change_reason, "Server opened");
    }

    #[test]
    fn test_close_is_idempotent() {
        let gate = AdmissionGate::new();
        assert!(gate.close(Some("maintenance".into())));
        let first = gate.status();

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!gate.close(Some("again".into())));
        let second = gate.status();

        assert_eq!(first, second);
        assert_eq!(second.last_change_reason, "maintenance");
    }

    #[test]
    fn test_open_is_idempotent() {
        let gate = AdmissionGate::new();
        let first = gate.status();

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(!gate.open(None));
        assert!(!gate.open(Some("ignored".into())));

        assert_eq!(gate.status(), first);
        assert_eq!(gate.status().last_change_reason, "Server started");
    }

    #[test]
    fn test_empty_reason_is_kept() {
        let gate = AdmissionGate::new();
        gate.close(Some(String::new()));
        assert_eq!(gate.status().last_change_reason, "");
    }

    #[test]
    fn test_initially_closed_gate() {
        let gate = AdmissionGate::with_initial_state(false, "warming up");
        assert!(!gate.is_open());
        assert_eq!(gate.status().status_label(), "CLOSED");
        assert_eq!(gate.status().last_change_reason, "warming up");
    }

    #[test]
    fn test_concurrent_transitions_alternate() {
        let gate = Arc::new(AdmissionGate::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = gate.clone();
                std::thread::spawn(move || {
                    let mut changes = 0;
                    for _ in 0..500 {
                        let changed = if i % 2 == 0 {
                            gate.close(Some("close".into()))
                        } else {
                            gate.open(Some("open".into()))
                        };
                        if changed {
                            changes += 1;
                        }
                        let status = gate.status();
                        assert_eq!(status.is_open, status.last_change_reason != "close");
                    }
                    changes
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        let status = gate.status();
        // Starting open, an odd number of effective transitions leaves it closed
        assert_eq!(status.is_open, total % 2 == 0);
    }
}
