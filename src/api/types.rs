//! Values returned by the simulation API

use crate::core::{AnchorId, DirectionEstimate, Measurement, MobileState};
use crate::processing::inertial::ImuSample;
use crate::validation::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Everything produced by one `advance` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Ground-truth position of the mobile node
    pub mobile: MobileState,
    /// One measurement per anchor, in anchor order
    pub measurements: Vec<Measurement>,
    pub direction: DirectionEstimate,
    /// Inertial reading, when traces are enabled
    pub inertial: Option<ImuSample>,
}

impl StepOutput {
    pub fn step(&self) -> u64 {
        self.mobile.step
    }

    pub fn measurement(&self, anchor_id: AnchorId) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.anchor_id == anchor_id)
    }

    /// Anchor with the highest RSSI this step
    pub fn strongest(&self) -> Option<&Measurement> {
        self.measurements
            .iter()
            .max_by(|a, b| a.rssi_dbm.total_cmp(&b.rssi_dbm))
    }

    /// Number of measurements altered by the negative-distance policy
    pub fn clamped_count(&self) -> usize {
        self.measurements.iter().filter(|m| m.clamped).count()
    }
}

/// Output encoding for step reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(SimulationError::invalid_config("format", s, "expected text, json or csv")),
        }
    }
}
