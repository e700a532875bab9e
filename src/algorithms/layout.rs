//! Reference node placement

use crate::core::{Anchor, AnchorId, Point2D, RADIO_PROPAGATION_SPEED};
use crate::validation::data::{require_finite_point, require_positive};
use crate::validation::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Rule that produces the fixed anchor set of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnchorLayout {
    /// `count` anchors evenly spaced on a circle, first one at angle 0
    Circular {
        center: Point2D,
        radius: f64,
        count: u32,
    },
    /// Circle sized so neighbouring anchors sit `spacing_wavelengths·λ` apart
    WavelengthSpaced {
        center: Point2D,
        frequency_hz: f64,
        spacing_wavelengths: f64,
        count: u32,
    },
    /// Hand-placed positions, ids assigned in list order
    Fixed { positions: Vec<Point2D> },
}

impl AnchorLayout {
    pub fn circular(center: Point2D, radius: f64, count: u32) -> Self {
        AnchorLayout::Circular { center, radius, count }
    }

    /// Access points in the four corners of a room, `inset` meters from the walls
    pub fn rectangular_room(width: f64, height: f64, inset: f64) -> Self {
        AnchorLayout::Fixed {
            positions: vec![
                Point2D::new(inset, inset),
                Point2D::new(width - inset, inset),
                Point2D::new(width - inset, height - inset),
                Point2D::new(inset, height - inset),
            ],
        }
    }

    /// Square with one corner at the origin
    pub fn square(side: f64) -> Self {
        AnchorLayout::Fixed {
            positions: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(side, 0.0),
                Point2D::new(side, side),
                Point2D::new(0.0, side),
            ],
        }
    }

    /// Radius of the circle the anchors sit on, if the layout is circular
    pub fn radius(&self) -> SimResult<Option<f64>> {
        match self {
            AnchorLayout::Circular { radius, .. } => Ok(Some(*radius)),
            AnchorLayout::WavelengthSpaced {
                frequency_hz,
                spacing_wavelengths,
                count,
                ..
            } => wavelength_spaced_radius(*frequency_hz, *spacing_wavelengths, *count).map(Some),
            AnchorLayout::Fixed { .. } => Ok(None),
        }
    }

    /// Generate the anchors
    pub fn anchors(&self) -> SimResult<Vec<Anchor>> {
        match self {
            AnchorLayout::Circular { center, radius, count } => {
                require_finite_point("anchor_layout.center", center)?;
                require_positive("anchor_radius", *radius)?;
                circular_positions(*center, *radius, *count)
            }
            AnchorLayout::WavelengthSpaced {
                center,
                frequency_hz,
                spacing_wavelengths,
                count,
            } => {
                require_finite_point("anchor_layout.center", center)?;
                let radius = wavelength_spaced_radius(*frequency_hz, *spacing_wavelengths, *count)?;
                circular_positions(*center, radius, *count)
            }
            AnchorLayout::Fixed { positions } => {
                for (i, position) in positions.iter().enumerate() {
                    require_finite_point(&format!("anchor_layout.positions[{}]", i), position)?;
                }
                Ok(positions
                    .iter()
                    .enumerate()
                    .map(|(i, position)| Anchor::new(i as AnchorId + 1, *position))
                    .collect())
            }
        }
    }
}

fn circular_positions(center: Point2D, radius: f64, count: u32) -> SimResult<Vec<Anchor>> {
    if count == 0 {
        return Err(SimulationError::invalid_config(
            "anchor_count",
            count,
            "circular layouts need at least one anchor",
        ));
    }

    Ok((0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            let position = Point2D::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            Anchor::new(i + 1, position)
        })
        .collect())
}

/// Radius that puts adjacent anchors on a chord of `spacing·λ`
pub fn wavelength_spaced_radius(
    frequency_hz: f64,
    spacing_wavelengths: f64,
    count: u32,
) -> SimResult<f64> {
    require_positive("anchor_layout.frequency_hz", frequency_hz)?;
    require_positive("anchor_layout.spacing_wavelengths", spacing_wavelengths)?;
    if count < 2 {
        return Err(SimulationError::invalid_config(
            "anchor_count",
            count,
            "wavelength spacing needs at least two anchors",
        ));
    }
    let wavelength = RADIO_PROPAGATION_SPEED / frequency_hz;
    Ok(spacing_wavelengths * wavelength / (2.0 * (PI / count as f64).sin()))
}
