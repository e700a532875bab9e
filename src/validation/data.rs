//! Numeric guards shared by configuration checks and the estimator

use crate::core::{Anchor, AnchorId, Measurement, Point2D};
use crate::validation::error::{SimResult, SimulationError};

/// Reject NaN and infinities in a configuration parameter
pub fn require_finite(parameter: &str, value: f64) -> SimResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::invalid_config(parameter, value, "must be a finite number"))
    }
}

/// Reject zero, negative and non-finite values
pub fn require_positive(parameter: &str, value: f64) -> SimResult<f64> {
    require_finite(parameter, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid_config(parameter, value, "must be positive"))
    }
}

/// Reject negative and non-finite values; zero is allowed
pub fn require_non_negative(parameter: &str, value: f64) -> SimResult<f64> {
    require_finite(parameter, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::invalid_config(parameter, value, "must not be negative"))
    }
}

pub fn require_finite_point(parameter: &str, point: &Point2D) -> SimResult<()> {
    require_finite(&format!("{}.x", parameter), point.x)?;
    require_finite(&format!("{}.y", parameter), point.y)?;
    Ok(())
}

/// Check a position that reaches the estimator at run time
pub fn check_position(anchor_id: Option<AnchorId>, position: &Point2D) -> SimResult<()> {
    if !position.x.is_finite() {
        return Err(SimulationError::invalid_measurement(anchor_id, "position.x", position.x));
    }
    if !position.y.is_finite() {
        return Err(SimulationError::invalid_measurement(anchor_id, "position.y", position.y));
    }
    Ok(())
}

/// Pair every anchor with its measurement, in anchor order
///
/// Measurements must be listed in the same order as the anchors and carry the
/// matching ids; anything else means the caller mixed up two steps or layouts.
pub fn pair_measurements<'a>(
    anchors: &'a [Anchor],
    measurements: &'a [Measurement],
) -> SimResult<Vec<(&'a Anchor, &'a Measurement)>> {
    if anchors.len() != measurements.len() {
        return Err(SimulationError::invalid_measurement(
            None,
            "measurement_count",
            measurements.len() as f64,
        ));
    }

    let mut pairs = Vec::with_capacity(anchors.len());
    for (anchor, measurement) in anchors.iter().zip(measurements) {
        if anchor.id != measurement.anchor_id {
            return Err(SimulationError::invalid_measurement(
                Some(anchor.id),
                "anchor_id",
                measurement.anchor_id as f64,
            ));
        }
        check_position(Some(anchor.id), &anchor.position)?;
        if !measurement.rssi_dbm.is_finite() {
            return Err(SimulationError::invalid_measurement(
                Some(anchor.id),
                "rssi_dbm",
                measurement.rssi_dbm,
            ));
        }
        pairs.push((anchor, measurement));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(anchor_id: AnchorId, rssi_dbm: f64) -> Measurement {
        Measurement {
            anchor_id,
            step: 0,
            true_distance: 1.0,
            noisy_distance: 1.0,
            rssi_dbm,
            clamped: false,
        }
    }

    #[test]
    fn test_positive_checks() {
        assert!(require_positive("radius", 1.0).is_ok());
        assert!(require_positive("radius", 0.0).is_err());
        assert!(require_positive("radius", f64::NAN).is_err());
        assert!(require_non_negative("sigma", 0.0).is_ok());
        assert!(require_non_negative("sigma", -0.1).is_err());
    }

    #[test]
    fn test_pairing_rejects_mismatched_ids() {
        let anchors = vec![
            Anchor::new(1, Point2D::new(0.0, 0.0)),
            Anchor::new(2, Point2D::new(1.0, 0.0)),
        ];
        let swapped = vec![measurement(2, -40.0), measurement(1, -40.0)];
        let err = pair_measurements(&anchors, &swapped).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidMeasurement { anchor_id: Some(1), .. }));

        let short = vec![measurement(1, -40.0)];
        assert!(pair_measurements(&anchors, &short).is_err());
    }

    #[test]
    fn test_pairing_rejects_non_finite_rssi() {
        let anchors = vec![Anchor::new(1, Point2D::new(0.0, 0.0))];
        let bad = vec![measurement(1, f64::NEG_INFINITY)];
        let err = pair_measurements(&anchors, &bad).unwrap_err();
        match err {
            SimulationError::InvalidMeasurement { field, .. } => assert_eq!(field, "rssi_dbm"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
