//! Core data types for the localization simulator

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anchor identifier, 1-based (`R1`, `R2`, ...)
pub type AnchorId = u32;

/// 2D position in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_vector(v: &Vector2<f64>) -> Self {
        Self { x: v.x, y: v.y }
    }

    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    /// Length of the point taken as a vector from the origin
    pub fn norm(&self) -> f64 {
        self.to_vector().norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Fixed reference node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: AnchorId,
    pub position: Point2D,
}

impl Anchor {
    pub fn new(id: AnchorId, position: Point2D) -> Self {
        Self { id, position }
    }

    /// Display label used by reports
    pub fn label(&self) -> String {
        format!("R{}", self.id)
    }
}

/// Ground-truth state of the mobile node at one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobileState {
    pub position: Point2D,
    pub step: u64,
}

/// One anchor reading produced at one step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub anchor_id: AnchorId,
    pub step: u64,
    /// Euclidean distance between anchor and mobile node (m)
    pub true_distance: f64,
    /// Distance after measurement noise and the negative-distance policy (m)
    pub noisy_distance: f64,
    /// Received signal strength (dBm)
    pub rssi_dbm: f64,
    /// Set when the raw noisy distance was non-positive
    pub clamped: bool,
}

/// Fused bearing for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionEstimate {
    pub step: u64,
    /// Unit vector, or zero when the weighted sum vanished
    pub resultant: Point2D,
    /// Bearing in (-180, 180]
    pub bearing_degrees: f64,
    /// Anchors that coincided with the mobile node and contributed nothing
    pub coincident_anchors: Vec<AnchorId>,
}

impl DirectionEstimate {
    /// Estimate for an empty anchor set or a vanished resultant
    pub fn zero(step: u64) -> Self {
        Self {
            step,
            resultant: Point2D::ORIGIN,
            bearing_degrees: 0.0,
            coincident_anchors: Vec::new(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.resultant.x == 0.0 && self.resultant.y == 0.0
    }
}
