pub mod health;
pub mod metrics;
pub mod packets;
pub mod server;

// Re-export handler functions
pub use health::*;
pub use metrics::*;
pub use packets::*;
pub use server::*;
