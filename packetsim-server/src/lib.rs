//! Packetsim server
//!
//! Wires configuration, the metrics backend, the admission gate, the packet
//! service and the REST API into one runnable HTTP server.

pub mod startup;

pub use startup::*;
