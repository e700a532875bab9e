//! Synthetic accelerometer and gyroscope traces
//!
//! Each axis is a random walk: the scaled cumulative sum of standard normal
//! draws. Traces come from a dedicated seed, so sampling never consumes the
//! measurement RNG.

use crate::core::DEFAULT_INERTIAL_SEED;
use crate::validation::data::require_non_negative;
use crate::validation::{SimResult, SimulationError};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Inertial trace parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InertialConfig {
    pub seed: u64,
    /// Step size of the accelerometer random walk
    pub accel_scale: f64,
    /// Step size of the gyroscope random walk
    pub gyro_scale: f64,
}

impl Default for InertialConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_INERTIAL_SEED,
            accel_scale: 0.5,
            gyro_scale: 0.3,
        }
    }
}

impl InertialConfig {
    pub fn validate(&self) -> SimResult<()> {
        require_non_negative("inertial.accel_scale", self.accel_scale)?;
        require_non_negative("inertial.gyro_scale", self.gyro_scale)?;
        Ok(())
    }
}

/// One inertial reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuSample {
    pub step: u64,
    pub accel: Vector3<f64>,
    pub gyro: Vector3<f64>,
}

/// Inertial traces covering `[0, max_steps)`, generated as steps are requested
///
/// The walk is extended up to the requested step and kept, so memory follows
/// the steps actually sampled rather than the length of the run.
#[derive(Debug, Clone)]
pub struct InertialSimulator {
    config: InertialConfig,
    max_steps: u64,
    rng: StdRng,
    accel_sum: Vector3<f64>,
    gyro_sum: Vector3<f64>,
    accel: Vec<Vector3<f64>>,
    gyro: Vec<Vector3<f64>>,
}

impl InertialSimulator {
    pub fn new(config: InertialConfig, max_steps: u64) -> SimResult<Self> {
        config.validate()?;
        if max_steps == 0 {
            return Err(SimulationError::invalid_config(
                "max_steps",
                max_steps,
                "a run needs at least one step",
            ));
        }

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            max_steps,
            accel_sum: Vector3::zeros(),
            gyro_sum: Vector3::zeros(),
            accel: Vec::new(),
            gyro: Vec::new(),
        })
    }

    pub fn config(&self) -> &InertialConfig {
        &self.config
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Number of samples generated so far
    pub fn generated(&self) -> usize {
        self.accel.len()
    }

    /// Reading at `step`, `None` at or past `max_steps`
    pub fn sample(&mut self, step: u64) -> Option<ImuSample> {
        if step >= self.max_steps {
            return None;
        }
        let i = usize::try_from(step).ok()?;
        while self.accel.len() <= i {
            self.extend();
        }
        Some(ImuSample {
            step,
            accel: self.accel[i],
            gyro: self.gyro[i],
        })
    }

    fn extend(&mut self) {
        self.accel_sum += standard_normal3(&mut self.rng);
        self.gyro_sum += standard_normal3(&mut self.rng);
        self.accel.push(self.accel_sum * self.config.accel_scale);
        self.gyro.push(self.gyro_sum * self.config.gyro_scale);
    }
}

fn standard_normal3<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    Vector3::new(
        rng.sample::<f64, _>(StandardNormal),
        rng.sample::<f64, _>(StandardNormal),
        rng.sample::<f64, _>(StandardNormal),
    )
}
