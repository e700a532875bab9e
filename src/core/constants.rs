//! Physical constants and simulation defaults

/// Propagation speed used when deriving wavelengths for anchor spacing (m/s)
pub const RADIO_PROPAGATION_SPEED: f64 = 3.0e8;

/// Default path loss at the 1 m reference distance (dB)
pub const DEFAULT_REFERENCE_LOSS_DB: f64 = 40.0;

/// Default shadowing standard deviation for the reference-loss model (dB)
pub const DEFAULT_NOISE_STD_DB: f64 = 2.0;

/// Default log-distance path loss exponent (free space)
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.0;

/// Steps spent on each side of the corridor loop
pub const DEFAULT_CORRIDOR_SEGMENT_STEPS: u64 = 50;

/// Smallest distance handed to the propagation model when clamping (m)
pub const MIN_MEASURABLE_DISTANCE_M: f64 = 0.01;

/// Default seed for the inertial sensor traces
pub const DEFAULT_INERTIAL_SEED: u64 = 42;

/// Number of true positions shown by a typical trail display
pub const DEFAULT_TRAIL_POINTS: usize = 200;

/// Range error of the direction-finding scenario (m)
pub const DEFAULT_DISTANCE_NOISE_STD_M: f64 = 0.2;

/// Carrier frequency of the direction-finding scenario (Hz)
pub const DEFAULT_CARRIER_FREQUENCY_HZ: f64 = 2.4e9;
