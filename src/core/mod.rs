//! Core types and constants for the localization simulator

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
