//! Configuration loading, presets and runtime adjustment

pub mod config;

pub use config::{ConfigurationManager, MotionKind, Scenario, SimulationConfig, SimulationOptions};
