//! Measurement generation: range noise, path loss, histories and inertial traces

pub mod inertial;
pub mod noise;
pub mod pipeline;
pub mod propagation;

pub use inertial::{ImuSample, InertialConfig, InertialSimulator};
pub use noise::MeasurementNoiseModel;
pub use pipeline::{MeasurementConfig, MeasurementPipeline, NegativeDistancePolicy};
pub use propagation::{PathLossVariant, PropagationModel};
