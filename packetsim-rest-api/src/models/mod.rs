//! Wire models that are specific to the HTTP surface

pub mod gate;

pub use gate::{GateStatusResponse, ReasonQuery};
