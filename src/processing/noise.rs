//! Gaussian range error applied before the propagation model

use crate::processing::propagation::gaussian;
use crate::validation::data::require_non_negative;
use crate::validation::SimResult;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Additive `N(0, sigma)` distance error
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementNoiseModel {
    /// Standard deviation of the range error (m)
    pub sigma_m: f64,
}

impl MeasurementNoiseModel {
    pub fn new(sigma_m: f64) -> SimResult<Self> {
        require_non_negative("measurement.distance_noise_std_m", sigma_m)?;
        Ok(Self { sigma_m })
    }

    /// Perturbed distance; never clamped, so it can go negative
    pub fn noisy_distance<R: Rng + ?Sized>(&self, true_distance: f64, rng: &mut R) -> f64 {
        true_distance + gaussian(self.sigma_m, rng)
    }
}

/// Explicit-parameter form of [`MeasurementNoiseModel::noisy_distance`]
pub fn noisy_distance<R: Rng + ?Sized>(true_distance: f64, sigma_m: f64, rng: &mut R) -> f64 {
    true_distance + gaussian(sigma_m, rng)
}
