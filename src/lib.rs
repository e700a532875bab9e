//! RSSI Localization Simulator
//!
//! Step-driven simulation of a mobile node moving among fixed anchors. Each
//! step produces noisy range and RSSI measurements per anchor and an
//! RSSI-weighted bearing estimate.

pub mod algorithms;
pub mod api;
pub mod core;
pub mod processing;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use algorithms::{
    AnchorLayout, CircularOrbit, CorridorLoop, DirectionConvention, DirectionEstimator, MotionPattern,
    MotionPatternConfig, TrajectoryGenerator,
};
pub use api::{OutputFormat, ReportWriter, Simulation, StepOutput, StepReport};
pub use crate::core::{Anchor, AnchorId, DirectionEstimate, Measurement, MobileState, Point2D};
pub use processing::{
    ImuSample, InertialConfig, InertialSimulator, MeasurementConfig, MeasurementNoiseModel, MeasurementPipeline,
    NegativeDistancePolicy, PathLossVariant, PropagationModel,
};
pub use utils::{ConfigurationManager, MotionKind, Scenario, SimulationConfig, SimulationOptions};
pub use validation::{ErrorScope, SimResult, SimulationError};
