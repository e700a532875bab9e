//! Geometry: anchor placement, mobile trajectories and bearing estimation

pub mod direction;
pub mod layout;
pub mod trajectory;

pub use direction::{DirectionConvention, DirectionEstimator};
pub use layout::AnchorLayout;
pub use trajectory::{CircularOrbit, CorridorLoop, MotionPattern, MotionPatternConfig, TrajectoryGenerator};
