//! RSSI-weighted vector resultant bearing
//!
//! Each anchor contributes the unit vector between itself and the mobile node,
//! scaled by its RSSI converted to linear power (`10^(rssi/10)`). The sum is
//! normalized and turned into a bearing, so weights are taken relative to the
//! strongest anchor without changing the result. Stronger anchors dominate
//! exponentially. This is a heuristic in the spirit of simple beamforming; it
//! is not a calibrated or statistically optimal estimator.

use crate::core::{Anchor, DirectionEstimate, Measurement, Point2D};
use crate::validation::data::{check_position, pair_measurements};
use crate::validation::SimResult;
use log::warn;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Sign of the per-anchor unit vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionConvention {
    /// `anchor - mobile`: the bearing points from the mobile node toward the
    /// anchors that are heard loudest
    #[default]
    TowardAnchor,
    /// `mobile - anchor`: the bearing points away from the loudest anchors
    AwayFromAnchor,
}

/// Fuses per-anchor directions into one bearing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DirectionEstimator {
    pub convention: DirectionConvention,
}

impl DirectionEstimator {
    pub fn new(convention: DirectionConvention) -> Self {
        Self { convention }
    }

    /// Unit vector for one anchor, zero when the two points coincide
    pub fn unit_vector(&self, anchor: &Point2D, mobile: &Point2D) -> Vector2<f64> {
        let v = match self.convention {
            DirectionConvention::TowardAnchor => anchor.to_vector() - mobile.to_vector(),
            DirectionConvention::AwayFromAnchor => mobile.to_vector() - anchor.to_vector(),
        };
        let magnitude = v.norm();
        if magnitude > 0.0 {
            v / magnitude
        } else {
            Vector2::zeros()
        }
    }

    /// Fuse the current step's measurements into a bearing
    ///
    /// `measurements` must list one entry per anchor, in anchor order.
    pub fn estimate(
        &self,
        step: u64,
        mobile_position: &Point2D,
        anchors: &[Anchor],
        measurements: &[Measurement],
    ) -> SimResult<DirectionEstimate> {
        check_position(None, mobile_position)?;
        let pairs = pair_measurements(anchors, measurements)?;

        let mut contributions = Vec::with_capacity(anchors.len());
        let mut coincident_anchors = Vec::new();

        for (anchor, measurement) in pairs {
            let unit = self.unit_vector(&anchor.position, mobile_position);
            if unit == Vector2::zeros() {
                warn!(
                    "step {}: anchor {} coincides with the mobile node, using zero vector",
                    step, anchor.id
                );
                coincident_anchors.push(anchor.id);
                continue;
            }
            contributions.push((unit, measurement.rssi_dbm));
        }

        // weights relative to the strongest anchor keep 10^(rssi/10) finite
        let strongest = contributions
            .iter()
            .map(|&(_, rssi)| rssi)
            .fold(f64::NEG_INFINITY, f64::max);
        let mut resultant = contributions
            .iter()
            .fold(Vector2::<f64>::zeros(), |sum, &(unit, rssi)| {
                sum + unit * linear_weight(rssi - strongest)
            });

        let magnitude = resultant.norm();
        if magnitude > 0.0 {
            resultant /= magnitude;
        } else {
            resultant = Vector2::zeros();
        }

        Ok(DirectionEstimate {
            step,
            resultant: Point2D::from_vector(&resultant),
            bearing_degrees: bearing_degrees(&resultant),
            coincident_anchors,
        })
    }
}

/// dBm to linear power weight
pub fn linear_weight(rssi_dbm: f64) -> f64 {
    10f64.powf(rssi_dbm / 10.0)
}

/// `atan2(y, x)` in degrees, folded into (-180, 180]
pub fn bearing_degrees(v: &Vector2<f64>) -> f64 {
    let degrees = v.y.atan2(v.x).to_degrees();
    if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

impl DirectionEstimate {
    /// Soft geometry errors raised while estimating
    pub fn warnings(&self) -> Vec<crate::validation::SimulationError> {
        self.coincident_anchors
            .iter()
            .map(|&anchor_id| crate::validation::SimulationError::DegenerateGeometry { anchor_id })
            .collect()
    }
}
