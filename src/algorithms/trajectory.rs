//! Ground-truth motion of the mobile node
//!
//! Every pattern is a pure function of the step index, so positions can be
//! queried out of order and a run can be replayed from any step.

use crate::core::{Point2D, DEFAULT_CORRIDOR_SEGMENT_STEPS};
use crate::validation::data::{require_finite, require_finite_point, require_non_negative, require_positive};
use crate::validation::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};

/// Motion model queried once per step
pub trait MotionPattern {
    /// True position at `step`
    fn position_at(&self, step: u64) -> Point2D;

    /// Short name used in logs and reports
    fn name(&self) -> &'static str;
}

/// `center + radius·(sin(tω), cos(tω))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularOrbit {
    pub center: Point2D,
    pub radius: f64,
    /// Radians per step
    pub angular_speed: f64,
}

impl CircularOrbit {
    pub fn new(center: Point2D, radius: f64, angular_speed: f64) -> SimResult<Self> {
        require_finite_point("motion_pattern.center", &center)?;
        require_positive("motion_pattern.radius", radius)?;
        require_finite("motion_pattern.angular_speed", angular_speed)?;
        Ok(Self { center, radius, angular_speed })
    }
}

impl MotionPattern for CircularOrbit {
    fn position_at(&self, step: u64) -> Point2D {
        let phase = step as f64 * self.angular_speed;
        Point2D::new(
            self.center.x + self.radius * phase.sin(),
            self.center.y + self.radius * phase.cos(),
        )
    }

    fn name(&self) -> &'static str {
        "circular"
    }
}

/// Loop around the interior perimeter of a `width × height` room
///
/// Phases run bottom (→), right (↑), top (←), left (↓), each lasting
/// `segment_length` steps; the loop repeats after four segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorLoop {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub segment_length: u64,
}

impl CorridorLoop {
    pub fn new(width: f64, height: f64, margin: f64, segment_length: u64) -> SimResult<Self> {
        require_positive("motion_pattern.width", width)?;
        require_positive("motion_pattern.height", height)?;
        require_non_negative("motion_pattern.margin", margin)?;
        if 2.0 * margin >= width.min(height) {
            return Err(SimulationError::invalid_config(
                "motion_pattern.margin",
                margin,
                "corridor margin leaves no room to move",
            ));
        }
        if segment_length == 0 {
            return Err(SimulationError::invalid_config(
                "motion_pattern.segment_length",
                segment_length,
                "must be at least one step",
            ));
        }
        Ok(Self { width, height, margin, segment_length })
    }

    /// Room loop with the default 50-step sides
    pub fn with_default_segments(width: f64, height: f64, margin: f64) -> SimResult<Self> {
        Self::new(width, height, margin, DEFAULT_CORRIDOR_SEGMENT_STEPS)
    }

    /// Steps needed to complete one lap
    pub fn period(&self) -> u64 {
        4 * self.segment_length
    }
}

impl MotionPattern for CorridorLoop {
    fn position_at(&self, step: u64) -> Point2D {
        let within_lap = step % self.period();
        let phase = within_lap / self.segment_length;
        let fraction = (within_lap % self.segment_length) as f64 / self.segment_length as f64;

        let span_x = self.width - 2.0 * self.margin;
        let span_y = self.height - 2.0 * self.margin;
        let far_x = self.width - self.margin;
        let far_y = self.height - self.margin;

        match phase {
            0 => Point2D::new(self.margin + fraction * span_x, self.margin),
            1 => Point2D::new(far_x, self.margin + fraction * span_y),
            2 => Point2D::new(far_x - fraction * span_x, far_y),
            _ => Point2D::new(self.margin, far_y - fraction * span_y),
        }
    }

    fn name(&self) -> &'static str {
        "corridor"
    }
}

/// Serializable choice of motion pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionPatternConfig {
    Circular {
        center: Point2D,
        radius: f64,
        angular_speed: f64,
    },
    Corridor {
        width: f64,
        height: f64,
        margin: f64,
        #[serde(default = "default_segment_length")]
        segment_length: u64,
    },
}

fn default_segment_length() -> u64 {
    DEFAULT_CORRIDOR_SEGMENT_STEPS
}

impl MotionPatternConfig {
    /// Validate and build the pattern
    pub fn build(&self) -> SimResult<Box<dyn MotionPattern + Send + Sync>> {
        match *self {
            MotionPatternConfig::Circular { center, radius, angular_speed } => {
                Ok(Box::new(CircularOrbit::new(center, radius, angular_speed)?))
            }
            MotionPatternConfig::Corridor { width, height, margin, segment_length } => {
                Ok(Box::new(CorridorLoop::new(width, height, margin, segment_length)?))
            }
        }
    }
}

/// Step-indexed position source bounded to `[0, max_steps)`
pub struct TrajectoryGenerator {
    pattern: Box<dyn MotionPattern + Send + Sync>,
    max_steps: u64,
}

impl TrajectoryGenerator {
    pub fn new(pattern: Box<dyn MotionPattern + Send + Sync>, max_steps: u64) -> SimResult<Self> {
        if max_steps == 0 {
            return Err(SimulationError::invalid_config(
                "max_steps",
                max_steps,
                "a run needs at least one step",
            ));
        }
        Ok(Self { pattern, max_steps })
    }

    pub fn from_config(config: &MotionPatternConfig, max_steps: u64) -> SimResult<Self> {
        Self::new(config.build()?, max_steps)
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    pub fn pattern_name(&self) -> &'static str {
        self.pattern.name()
    }

    /// True position at `step`
    pub fn position(&self, step: i64) -> SimResult<Point2D> {
        let index = self.check_step(step)?;
        Ok(self.pattern.position_at(index))
    }

    /// Convert a signed step into an index inside the run
    pub fn check_step(&self, step: i64) -> SimResult<u64> {
        if step < 0 {
            return Err(SimulationError::invalid_step(step, "step index must not be negative"));
        }
        let index = step as u64;
        if index >= self.max_steps {
            return Err(SimulationError::invalid_step(
                step,
                format!("run is limited to {} steps", self.max_steps),
            ));
        }
        Ok(index)
    }
}

impl std::fmt::Debug for TrajectoryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrajectoryGenerator")
            .field("pattern", &self.pattern.name())
            .field("max_steps", &self.max_steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_stays_on_circle() {
        let center = Point2D::new(5.0, 5.0);
        let orbit = CircularOrbit::new(center, 3.0, 0.1).unwrap();
        for step in (0..2000).step_by(7) {
            let p = orbit.position_at(step);
            assert!((p.distance_to(&center) - 3.0).abs() < 1e-9);
        }
        let far = orbit.position_at(u32::MAX as u64);
        assert!((far.distance_to(&center) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_orbit_starts_north_of_center() {
        let orbit = CircularOrbit::new(Point2D::ORIGIN, 2.0, 0.5).unwrap();
        let p = orbit.position_at(0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_orbit_is_order_independent() {
        let orbit = CircularOrbit::new(Point2D::ORIGIN, 1.0, 0.03).unwrap();
        let forward: Vec<Point2D> = (0..10).map(|t| orbit.position_at(t)).collect();
        let backward: Vec<Point2D> = (0..10).rev().map(|t| orbit.position_at(t)).collect();
        for (a, b) in forward.iter().zip(backward.iter().rev()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_corridor_phase_corners() {
        let corridor = CorridorLoop::with_default_segments(20.0, 15.0, 1.0).unwrap();
        assert_eq!(corridor.position_at(0), Point2D::new(1.0, 1.0));
        assert_eq!(corridor.position_at(25), Point2D::new(10.0, 1.0));
        assert_eq!(corridor.position_at(50), Point2D::new(19.0, 1.0));
        assert_eq!(corridor.position_at(100), Point2D::new(19.0, 14.0));
        assert_eq!(corridor.position_at(150), Point2D::new(1.0, 14.0));
        assert_eq!(corridor.position_at(175), Point2D::new(1.0, 7.5));
    }

    #[test]
    fn test_corridor_wraps_after_lap() {
        let corridor = CorridorLoop::new(20.0, 15.0, 1.0, 10).unwrap();
        assert_eq!(corridor.period(), 40);
        for step in 0..40 {
            assert_eq!(corridor.position_at(step), corridor.position_at(step + 40));
        }
    }

    #[test]
    fn test_corridor_stays_on_perimeter() {
        let corridor = CorridorLoop::with_default_segments(20.0, 15.0, 1.0).unwrap();
        for step in 0..400 {
            let p = corridor.position_at(step);
            let on_vertical = (p.x - 1.0).abs() < 1e-9 || (p.x - 19.0).abs() < 1e-9;
            let on_horizontal = (p.y - 1.0).abs() < 1e-9 || (p.y - 14.0).abs() < 1e-9;
            assert!(on_vertical || on_horizontal, "step {} off the corridor: {}", step, p);
            assert!(p.x >= 1.0 - 1e-9 && p.x <= 19.0 + 1e-9);
            assert!(p.y >= 1.0 - 1e-9 && p.y <= 14.0 + 1e-9);
        }
    }

    #[test]
    fn test_corridor_rejects_bad_geometry() {
        assert!(CorridorLoop::new(4.0, 4.0, 2.0, 50).is_err());
        assert!(CorridorLoop::new(20.0, 15.0, 1.0, 0).is_err());
        assert!(CorridorLoop::new(-1.0, 15.0, 1.0, 50).is_err());
    }

    #[test]
    fn test_generator_step_bounds() {
        let config = MotionPatternConfig::Circular {
            center: Point2D::ORIGIN,
            radius: 1.0,
            angular_speed: 0.1,
        };
        let generator = TrajectoryGenerator::from_config(&config, 10).unwrap();
        assert!(generator.position(0).is_ok());
        assert!(generator.position(9).is_ok());
        assert!(matches!(
            generator.position(-1),
            Err(SimulationError::InvalidStep { step: -1, .. })
        ));
        assert!(matches!(
            generator.position(10),
            Err(SimulationError::InvalidStep { step: 10, .. })
        ));
        assert!(TrajectoryGenerator::from_config(&config, 0).is_err());
    }

    #[test]
    fn test_corridor_config_default_segment() {
        let json = r#"{"kind":"corridor","width":20.0,"height":15.0,"margin":1.0}"#;
        let config: MotionPatternConfig = serde_json::from_str(json).unwrap();
        match config {
            MotionPatternConfig::Corridor { segment_length, .. } => assert_eq!(segment_length, 50),
            other => panic!("unexpected pattern: {:?}", other),
        }
    }
}
