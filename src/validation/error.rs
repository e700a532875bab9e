//! Error taxonomy for the simulation core

use crate::core::AnchorId;
use thiserror::Error;

/// Errors raised by configuration, stepping and estimation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Rejected at setup time; the run cannot start
    #[error("invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Step index negative, out of order or past the end of the run
    #[error("invalid step {step}: {reason}")]
    InvalidStep { step: i64, reason: String },

    /// Non-finite or inconsistent value reaching the estimator
    #[error("invalid measurement ({}): {field} = {value}", anchor_label(.anchor_id))]
    InvalidMeasurement {
        anchor_id: Option<AnchorId>,
        field: String,
        value: f64,
    },

    /// Anchor and mobile node coincide; handled with a zero vector
    #[error("degenerate geometry: anchor {anchor_id} coincides with the mobile node")]
    DegenerateGeometry { anchor_id: AnchorId },

    /// History requested for an anchor that is not part of the layout
    #[error("unknown anchor {anchor_id}")]
    UnknownAnchor { anchor_id: AnchorId },

    #[error("configuration file error: {message}")]
    ConfigIo { message: String },

    #[error("configuration format error: {message}")]
    ConfigFormat { message: String },
}

fn anchor_label(anchor_id: &Option<AnchorId>) -> String {
    match anchor_id {
        Some(id) => format!("anchor {}", id),
        None => "mobile node".to_string(),
    }
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimulationError>;

/// How a caller should react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// The run cannot continue
    Run,
    /// Only the current call was rejected
    Call,
    /// Informational; a fallback value was already substituted
    None,
}

impl SimulationError {
    pub fn invalid_config(parameter: &str, value: impl ToString, reason: &str) -> Self {
        SimulationError::InvalidConfiguration {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_step(step: i64, reason: impl Into<String>) -> Self {
        SimulationError::InvalidStep {
            step,
            reason: reason.into(),
        }
    }

    pub fn invalid_measurement(anchor_id: Option<AnchorId>, field: &str, value: f64) -> Self {
        SimulationError::InvalidMeasurement {
            anchor_id,
            field: field.to_string(),
            value,
        }
    }

    pub fn scope(&self) -> ErrorScope {
        match self {
            SimulationError::InvalidConfiguration { .. } => ErrorScope::Run,
            SimulationError::ConfigIo { .. } => ErrorScope::Run,
            SimulationError::ConfigFormat { .. } => ErrorScope::Run,
            SimulationError::InvalidStep { .. } => ErrorScope::Call,
            SimulationError::InvalidMeasurement { .. } => ErrorScope::Call,
            SimulationError::UnknownAnchor { .. } => ErrorScope::Call,
            SimulationError::DegenerateGeometry { .. } => ErrorScope::None,
        }
    }

    /// True when the run has to be reconfigured before continuing
    pub fn is_fatal(&self) -> bool {
        self.scope() == ErrorScope::Run
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(error: serde_json::Error) -> Self {
        SimulationError::ConfigFormat {
            message: error.to_string(),
        }
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(error: std::io::Error) -> Self {
        SimulationError::ConfigIo {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimulationError::invalid_config("anchor_count", 0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration: anchor_count = 0 (must be positive)"
        );

        let err = SimulationError::invalid_measurement(Some(4), "rssi_dbm", f64::NAN);
        assert_eq!(err.to_string(), "invalid measurement (anchor 4): rssi_dbm = NaN");

        let err = SimulationError::invalid_measurement(None, "position.x", f64::INFINITY);
        assert_eq!(err.to_string(), "invalid measurement (mobile node): position.x = inf");
    }

    #[test]
    fn test_error_scope() {
        assert!(SimulationError::invalid_config("max_steps", 0, "zero").is_fatal());
        assert!(!SimulationError::invalid_step(-1, "negative").is_fatal());
        assert_eq!(
            SimulationError::DegenerateGeometry { anchor_id: 1 }.scope(),
            ErrorScope::None
        );
        assert_eq!(
            SimulationError::UnknownAnchor { anchor_id: 9 }.scope(),
            ErrorScope::Call
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: SimulationError = parse.unwrap_err().into();
        assert!(matches!(err, SimulationError::ConfigFormat { .. }));
        assert!(err.is_fatal());
    }
}
