use crate::algorithms::direction::DirectionConvention;
use crate::algorithms::layout::{wavelength_spaced_radius, AnchorLayout};
use crate::algorithms::trajectory::MotionPatternConfig;
use crate::core::{
    Point2D, DEFAULT_CARRIER_FREQUENCY_HZ, DEFAULT_CORRIDOR_SEGMENT_STEPS,
    DEFAULT_DISTANCE_NOISE_STD_M, DEFAULT_NOISE_STD_DB, DEFAULT_PATH_LOSS_EXPONENT,
    DEFAULT_REFERENCE_LOSS_DB,
};
use crate::processing::inertial::InertialConfig;
use crate::processing::noise::MeasurementNoiseModel;
use crate::processing::pipeline::{MeasurementConfig, NegativeDistancePolicy};
use crate::processing::propagation::PropagationModel;
use crate::validation::data::require_positive;
use crate::validation::{SimResult, SimulationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Complete description of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Where the reference nodes sit
    pub anchor_layout: AnchorLayout,
    /// How the mobile node moves
    pub motion_pattern: MotionPatternConfig,
    /// Distance to RSSI conversion
    pub propagation: PropagationModel,
    /// Range noise and its negative-distance policy
    pub measurement: MeasurementConfig,
    /// Sign of the per-anchor direction vectors
    #[serde(default)]
    pub direction_convention: DirectionConvention,
    /// Number of steps in the run
    pub max_steps: u64,
    /// Seed of the measurement RNG
    pub rng_seed: u64,
    /// Inertial traces, if generated
    #[serde(default)]
    pub inertial: Option<InertialConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Scenario::Octonode.config()
    }
}

impl SimulationConfig {
    /// Check every component without building the run
    pub fn validate(&self) -> SimResult<()> {
        self.anchor_layout.anchors()?;
        self.motion_pattern.build()?;
        self.propagation.validate()?;
        MeasurementNoiseModel::new(self.measurement.distance_noise_std_m)?;
        if self.max_steps == 0 {
            return Err(SimulationError::invalid_config(
                "max_steps",
                self.max_steps,
                "a run needs at least one step",
            ));
        }
        if let Some(inertial) = &self.inertial {
            inertial.validate()?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = fs::read_to_string(&path).map_err(|e| SimulationError::ConfigIo {
            message: format!("failed to read config file '{}': {}", path_str, e),
        })?;
        let config: SimulationConfig =
            serde_json::from_str(&content).map_err(|e| SimulationError::ConfigFormat {
                message: format!("failed to parse config file '{}': {}", path_str, e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SimResult<()> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = self.to_json_pretty()?;
        fs::write(&path, content).map_err(|e| SimulationError::ConfigIo {
            message: format!("failed to write config file '{}': {}", path_str, e),
        })
    }
}

/// Ready-made scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Four anchors on a 10 m square, noiseless orbit
    Outdoor,
    /// Room access points with a corridor walk
    Indoor,
    /// Eight-element 2.4 GHz ring for direction finding
    Octonode,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Outdoor, Scenario::Indoor, Scenario::Octonode];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Outdoor => "outdoor",
            Scenario::Indoor => "indoor",
            Scenario::Octonode => "octonode",
        }
    }

    pub fn config(&self) -> SimulationConfig {
        match self {
            Scenario::Outdoor => SimulationConfig {
                anchor_layout: AnchorLayout::square(10.0),
                motion_pattern: MotionPatternConfig::Circular {
                    center: Point2D::new(5.0, 5.0),
                    radius: 3.0,
                    angular_speed: 0.1,
                },
                propagation: PropagationModel::free_space(DEFAULT_PATH_LOSS_EXPONENT, 0.0),
                measurement: MeasurementConfig::default(),
                direction_convention: DirectionConvention::default(),
                max_steps: 200,
                rng_seed: 0,
                inertial: Some(InertialConfig::default()),
            },
            Scenario::Indoor => SimulationConfig {
                anchor_layout: AnchorLayout::rectangular_room(20.0, 15.0, 1.0),
                motion_pattern: MotionPatternConfig::Corridor {
                    width: 20.0,
                    height: 15.0,
                    margin: 1.0,
                    segment_length: DEFAULT_CORRIDOR_SEGMENT_STEPS,
                },
                propagation: PropagationModel::free_space(2.5, 3.0),
                measurement: MeasurementConfig::default(),
                direction_convention: DirectionConvention::default(),
                max_steps: 200,
                rng_seed: 0,
                inertial: None,
            },
            Scenario::Octonode => {
                let count = 8;
                let spacing = 2.0;
                // constant arguments, cannot fail
                let anchor_radius =
                    wavelength_spaced_radius(DEFAULT_CARRIER_FREQUENCY_HZ, spacing, count)
                        .unwrap_or_default();
                SimulationConfig {
                    anchor_layout: AnchorLayout::WavelengthSpaced {
                        center: Point2D::ORIGIN,
                        frequency_hz: DEFAULT_CARRIER_FREQUENCY_HZ,
                        spacing_wavelengths: spacing,
                        count,
                    },
                    motion_pattern: MotionPatternConfig::Circular {
                        center: Point2D::ORIGIN,
                        radius: 2.5 * anchor_radius,
                        angular_speed: 0.03,
                    },
                    propagation: PropagationModel::reference_loss(
                        0.0,
                        DEFAULT_REFERENCE_LOSS_DB,
                        DEFAULT_PATH_LOSS_EXPONENT,
                        DEFAULT_NOISE_STD_DB,
                    ),
                    measurement: MeasurementConfig {
                        distance_noise_std_m: DEFAULT_DISTANCE_NOISE_STD_M,
                        negative_distance_policy: NegativeDistancePolicy::Clamp,
                    },
                    direction_convention: DirectionConvention::default(),
                    max_steps: 300,
                    rng_seed: 0,
                    inertial: Some(InertialConfig::default()),
                }
            }
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                SimulationError::invalid_config("preset", s, "expected outdoor, indoor or octonode")
            })
    }
}

/// Motion choice in the flat option set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    #[default]
    Circular,
    Corridor,
}

/// Flat option set for simple circular-ring runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationOptions {
    pub anchor_count: u32,
    /// Ring radius (m)
    pub anchor_radius: f64,
    pub path_loss_exponent: f64,
    /// Shadowing standard deviation (dB)
    pub noise_std_db: f64,
    pub tx_power_dbm: f64,
    pub motion_pattern: MotionKind,
    pub max_steps: u64,
    pub rng_seed: u64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            anchor_count: 8,
            anchor_radius: 1.0,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            noise_std_db: DEFAULT_NOISE_STD_DB,
            tx_power_dbm: 0.0,
            motion_pattern: MotionKind::Circular,
            max_steps: 300,
            rng_seed: 0,
        }
    }
}

impl SimulationOptions {
    /// Expand into a full configuration
    ///
    /// The ring sits at the origin for orbits, which circle at 2.5 ring radii.
    /// Corridor runs use a square room of 5 ring radii with the ring centred
    /// in it.
    pub fn into_config(self) -> SimResult<SimulationConfig> {
        require_positive("anchor_radius", self.anchor_radius)?;
        let r = self.anchor_radius;

        let (center, motion_pattern) = match self.motion_pattern {
            MotionKind::Circular => (
                Point2D::ORIGIN,
                MotionPatternConfig::Circular {
                    center: Point2D::ORIGIN,
                    radius: 2.5 * r,
                    angular_speed: 0.03,
                },
            ),
            MotionKind::Corridor => (
                Point2D::new(2.5 * r, 2.5 * r),
                MotionPatternConfig::Corridor {
                    width: 5.0 * r,
                    height: 5.0 * r,
                    margin: 0.5 * r,
                    segment_length: DEFAULT_CORRIDOR_SEGMENT_STEPS,
                },
            ),
        };

        let config = SimulationConfig {
            anchor_layout: AnchorLayout::circular(center, r, self.anchor_count),
            motion_pattern,
            propagation: PropagationModel::reference_loss(
                self.tx_power_dbm,
                DEFAULT_REFERENCE_LOSS_DB,
                self.path_loss_exponent,
                self.noise_std_db,
            ),
            measurement: MeasurementConfig {
                distance_noise_std_m: DEFAULT_DISTANCE_NOISE_STD_M,
                negative_distance_policy: NegativeDistancePolicy::Clamp,
            },
            direction_convention: DirectionConvention::default(),
            max_steps: self.max_steps,
            rng_seed: self.rng_seed,
            inertial: None,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Holds a configuration and applies validated runtime adjustments
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    config: SimulationConfig,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            is_modified: false,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        Self::new(SimulationConfig::load_from_file(path)?)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn into_config(self) -> SimulationConfig {
        self.config
    }

    /// Check if the configuration changed since it was loaded
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> SimResult<()> {
        self.config.save_to_file(path)?;
        self.is_modified = false;
        Ok(())
    }

    // Runtime parameter adjustment; each setter returns the previous value

    pub fn set_rng_seed(&mut self, seed: u64) -> u64 {
        let old_value = self.config.rng_seed;
        self.config.rng_seed = seed;
        self.is_modified = true;
        old_value
    }

    pub fn set_max_steps(&mut self, max_steps: u64) -> SimResult<u64> {
        let old_value = self.config.max_steps;
        if max_steps == 0 {
            return Err(SimulationError::invalid_config(
                "max_steps",
                max_steps,
                "a run needs at least one step",
            ));
        }
        self.config.max_steps = max_steps;
        self.is_modified = true;
        Ok(old_value)
    }

    pub fn set_noise_std_db(&mut self, noise_std_db: f64) -> SimResult<f64> {
        let old_value = self.config.propagation.noise_std_db;
        let candidate = PropagationModel {
            noise_std_db,
            ..self.config.propagation
        };
        candidate.validate()?;
        self.config.propagation = candidate;
        self.is_modified = true;
        Ok(old_value)
    }

    pub fn set_distance_noise_std_m(&mut self, sigma_m: f64) -> SimResult<f64> {
        let old_value = self.config.measurement.distance_noise_std_m;
        MeasurementNoiseModel::new(sigma_m)?;
        self.config.measurement.distance_noise_std_m = sigma_m;
        self.is_modified = true;
        Ok(old_value)
    }

    pub fn set_path_loss_exponent(&mut self, exponent: f64) -> SimResult<f64> {
        let old_value = self.config.propagation.path_loss_exponent;
        let candidate = PropagationModel {
            path_loss_exponent: exponent,
            ..self.config.propagation
        };
        candidate.validate()?;
        self.config.propagation = candidate;
        self.is_modified = true;
        Ok(old_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for scenario in Scenario::ALL {
            let config = scenario.config();
            assert!(config.validate().is_ok(), "{} preset invalid", scenario);
        }
    }

    #[test]
    fn test_octonode_geometry() {
        let config = Scenario::Octonode.config();
        let anchor_radius = config.anchor_layout.radius().unwrap().unwrap();
        match config.motion_pattern {
            MotionPatternConfig::Circular { radius, angular_speed, .. } => {
                assert!((radius - 2.5 * anchor_radius).abs() < 1e-12);
                assert!((angular_speed - 0.03).abs() < 1e-12);
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
        assert_eq!(config.max_steps, 300);
        assert!(config.inertial.is_some());
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(Scenario::Outdoor.config().inertial, Some(InertialConfig::default()));
    }

    #[test]
    fn test_scenario_parsing() {
        assert_eq!("indoor".parse::<Scenario>().unwrap(), Scenario::Indoor);
        assert_eq!("OUTDOOR".parse::<Scenario>().unwrap(), Scenario::Outdoor);
        assert!(matches!(
            "orbit".parse::<Scenario>(),
            Err(SimulationError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_config() {
        let config = Scenario::Indoor.config();
        let json = config.to_json_pretty().unwrap();
        let back = SimulationConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_defaults_for_optional_fields() {
        let mut value = serde_json::to_value(Scenario::Outdoor.config()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("direction_convention");
        object.remove("inertial");
        let config = SimulationConfig::from_json_str(&value.to_string()).unwrap();
        assert_eq!(config.direction_convention, DirectionConvention::TowardAnchor);
        assert!(config.inertial.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Scenario::Outdoor.config();
        config.max_steps = 0;
        assert!(config.validate().is_err());

        let mut config = Scenario::Outdoor.config();
        config.anchor_layout = AnchorLayout::circular(Point2D::ORIGIN, 1.0, 0);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidConfiguration { .. })
        ));

        let mut config = Scenario::Outdoor.config();
        config.measurement.distance_noise_std_m = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SimulationConfig::from_json_str("{ not json"),
            Err(SimulationError::ConfigFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("rssi_localization_missing_config.json");
        let _ = fs::remove_file(&path);
        assert!(matches!(
            SimulationConfig::load_from_file(&path),
            Err(SimulationError::ConfigIo { .. })
        ));
    }

    #[test]
    fn test_options_into_config() {
        let options = SimulationOptions {
            anchor_count: 6,
            anchor_radius: 2.0,
            tx_power_dbm: -5.0,
            ..Default::default()
        };
        let config = options.into_config().unwrap();
        assert_eq!(config.anchor_layout.anchors().unwrap().len(), 6);
        assert_eq!(config.propagation.tx_power_dbm, -5.0);
        assert_eq!(config.max_steps, 300);

        let corridor = SimulationOptions {
            motion_pattern: MotionKind::Corridor,
            ..Default::default()
        };
        assert!(corridor.into_config().is_ok());
    }

    #[test]
    fn test_invalid_options() {
        let zero = SimulationOptions { anchor_count: 0, ..Default::default() };
        assert!(zero.into_config().is_err());
        let radius = SimulationOptions { anchor_radius: 0.0, ..Default::default() };
        assert!(radius.into_config().is_err());
        let steps = SimulationOptions { max_steps: 0, ..Default::default() };
        assert!(steps.into_config().is_err());
        let exponent = SimulationOptions { path_loss_exponent: -2.0, ..Default::default() };
        assert!(exponent.into_config().is_err());
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let json = r#"{"anchor_count":4,"anchor_radius":1.0,"path_loss_exponent":2.0,
            "noise_std_db":2.0,"tx_power_dbm":0.0,"motion_pattern":"corridor",
            "max_steps":10,"rng_seed":1,"frequency":2.4e9}"#;
        assert!(serde_json::from_str::<SimulationOptions>(json).is_err());
    }

    #[test]
    fn test_runtime_adjustments_return_old_value() {
        let mut manager = ConfigurationManager::new(Scenario::Octonode.config()).unwrap();
        assert!(!manager.is_modified());

        assert_eq!(manager.set_rng_seed(9), 0);
        assert_eq!(manager.set_max_steps(50).unwrap(), 300);
        assert_eq!(manager.set_noise_std_db(4.0).unwrap(), 2.0);
        assert!((manager.set_distance_noise_std_m(0.5).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(manager.set_path_loss_exponent(3.0).unwrap(), 2.0);
        assert!(manager.is_modified());

        assert_eq!(manager.config().rng_seed, 9);
        assert_eq!(manager.config().propagation.path_loss_exponent, 3.0);
    }

    #[test]
    fn test_runtime_adjustments_validate() {
        let mut manager = ConfigurationManager::default();
        assert!(manager.set_max_steps(0).is_err());
        assert!(manager.set_noise_std_db(-1.0).is_err());
        assert!(manager.set_path_loss_exponent(0.0).is_err());
        assert!(manager.set_distance_noise_std_m(f64::NAN).is_err());
        assert!(!manager.is_modified());
        assert_eq!(manager.config().max_steps, 300);
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join("rssi_localization_config_test.json");
        let mut manager = ConfigurationManager::new(Scenario::Indoor.config()).unwrap();
        manager.set_rng_seed(77);
        manager.save_to_file(&path).unwrap();
        assert!(!manager.is_modified());

        let loaded = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(loaded.config(), manager.config());
        let _ = fs::remove_file(path);
    }
}
