//! Graceful shutdown coordination
//!
//! The coordinator holds the shutdown state in a watch channel, so a
//! subscriber that arrives after the signal was sent still observes it.

use log::{info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Shutdown signal types with escalating urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// Stop accepting new work, let in-flight requests finish
    Graceful,
    /// Drain timeout elapsed, abandon whatever is still running
    Forced,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Graceful => write!(f, "graceful"),
            ShutdownSignal::Forced => write!(f, "forced"),
        }
    }
}

/// Shutdown error types
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    /// Shutdown already in progress
    #[error("Shutdown already in progress")]
    AlreadyShuttingDown,

    /// In-flight work remained after the drain timeout
    #[error("Forced shutdown completed with {0} requests still in flight")]
    TasksRemaining(usize),
}

/// Graceful shutdown coordinator
#[derive(Debug)]
pub struct ShutdownCoordinator {
    sender: watch::Sender<Option<ShutdownSignal>>,
    in_flight: Arc<AtomicUsize>,
    drain_timeout: Duration,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator with a 30 second drain timeout
    pub fn new() -> Self {
        Self::with_drain_timeout(Duration::from_secs(30))
    }

    /// Create a new shutdown coordinator with a custom drain timeout
    pub fn with_drain_timeout(drain_timeout: Duration) -> Self {
        let (sender, _) = watch::channel(None);

        Self {
            sender,
            in_flight: Arc::new(AtomicUsize::new(0)),
            drain_timeout,
        }
    }

    /// Subscribe to shutdown state changes
    pub fn subscribe(&self) -> watch::Receiver<Option<ShutdownSignal>> {
        self.sender.subscribe()
    }

    /// Current signal, if shutdown has started
    pub fn signal(&self) -> Option<ShutdownSignal> {
        *self.sender.borrow()
    }

    /// Check if shutdown is in progress
    pub fn is_shutting_down(&self) -> bool {
        self.signal().is_some()
    }

    /// Mark a unit of work as in flight until the guard is dropped
    pub fn track(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: self.in_flight.clone(),
        }
    }

    /// Number of tracked units still running
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Resolve once any shutdown signal has been sent
    pub async fn wait_for_signal(&self) -> ShutdownSignal {
        let mut receiver = self.sender.subscribe();
        let state = receiver
            .wait_for(|state| state.is_some())
            .await
            .map(|state| *state);
        // Sender lives as long as self
        state.ok().flatten().unwrap_or(ShutdownSignal::Forced)
    }

    /// Send the graceful signal without waiting for in-flight work.
    /// Returns false if shutdown had already started.
    pub fn trigger(&self) -> bool {
        self.sender.send_if_modified(|state| {
            if state.is_none() {
                *state = Some(ShutdownSignal::Graceful);
                true
            } else {
                false
            }
        })
    }

    /// Initiate shutdown and wait for in-flight work to drain, escalating
    /// to a forced signal when the drain timeout elapses
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        if !self.trigger() {
            return Err(ShutdownError::AlreadyShuttingDown);
        }

        info!("Starting graceful shutdown");
        self.drain().await
    }

    /// Wait for in-flight work after the signal has been sent
    pub async fn drain(&self) -> Result<(), ShutdownError> {
        if self.wait_for_in_flight(self.drain_timeout).await {
            info!("Graceful shutdown completed successfully");
            return Ok(());
        }

        self.sender.send_replace(Some(ShutdownSignal::Forced));

        let remaining = self.in_flight_count();
        warn!(
            "Drain timeout elapsed, forcing shutdown with {} requests in flight",
            remaining
        );
        Err(ShutdownError::TasksRemaining(remaining))
    }

    async fn wait_for_in_flight(&self, timeout_duration: Duration) -> bool {
        let start = tokio::time::Instant::now();

        while start.elapsed() < timeout_duration {
            let active = self.in_flight_count();
            if active == 0 {
                return true;
            }

            // Adaptive sleep based on in-flight count
            let sleep_duration = if active > 10 {
                Duration::from_millis(100)
            } else {
                Duration::from_millis(50)
            };

            tokio::time::sleep(sleep_duration).await;
        }

        self.in_flight_count() == 0
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight count on drop
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
