//! Error types and input validation

pub mod data;
pub mod error;

pub use error::{ErrorScope, SimResult, SimulationError};
