//! Log-distance path loss model with Gaussian shadowing

use crate::core::{DEFAULT_NOISE_STD_DB, DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_LOSS_DB};
use crate::validation::data::{require_finite, require_non_negative, require_positive};
use crate::validation::SimResult;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Formula used to turn distance into received power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathLossVariant {
    /// `-10·n·log10(d)`; transmit power is ignored
    FreeSpace,
    /// `tx - (L_ref + 10·n·log10(d))`
    ReferenceLoss,
}

/// Distance to RSSI conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    pub variant: PathLossVariant,
    /// Transmit power (dBm)
    pub tx_power_dbm: f64,
    /// Path loss exponent n
    pub path_loss_exponent: f64,
    /// Loss at the 1 m reference distance (dB), reference-loss variant only
    pub reference_loss_db: f64,
    /// Shadowing standard deviation (dB)
    pub noise_std_db: f64,
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self {
            variant: PathLossVariant::ReferenceLoss,
            tx_power_dbm: 0.0,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            reference_loss_db: DEFAULT_REFERENCE_LOSS_DB,
            noise_std_db: DEFAULT_NOISE_STD_DB,
        }
    }
}

impl PropagationModel {
    /// Free-space model with the given exponent and shadowing
    pub fn free_space(path_loss_exponent: f64, noise_std_db: f64) -> Self {
        Self {
            variant: PathLossVariant::FreeSpace,
            path_loss_exponent,
            noise_std_db,
            ..Default::default()
        }
    }

    /// Reference-loss model
    pub fn reference_loss(
        tx_power_dbm: f64,
        reference_loss_db: f64,
        path_loss_exponent: f64,
        noise_std_db: f64,
    ) -> Self {
        Self {
            variant: PathLossVariant::ReferenceLoss,
            tx_power_dbm,
            path_loss_exponent,
            reference_loss_db,
            noise_std_db,
        }
    }

    /// Same model with shadowing disabled
    pub fn noiseless(mut self) -> Self {
        self.noise_std_db = 0.0;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        require_finite("propagation.tx_power_dbm", self.tx_power_dbm)?;
        require_positive("propagation.path_loss_exponent", self.path_loss_exponent)?;
        require_finite("propagation.reference_loss_db", self.reference_loss_db)?;
        require_non_negative("propagation.noise_std_db", self.noise_std_db)?;
        Ok(())
    }

    /// Expected RSSI without shadowing
    pub fn mean_rssi(&self, distance: f64) -> f64 {
        // log10 is undefined here; report the transmit power instead
        if !(distance > 0.0) {
            return self.tx_power_dbm;
        }
        let spreading = 10.0 * self.path_loss_exponent * distance.log10();
        match self.variant {
            PathLossVariant::FreeSpace => -spreading,
            PathLossVariant::ReferenceLoss => {
                self.tx_power_dbm - (self.reference_loss_db + spreading)
            }
        }
    }

    /// RSSI with one shadowing draw from `rng`
    pub fn rssi<R: Rng + ?Sized>(&self, distance: f64, rng: &mut R) -> f64 {
        if !(distance > 0.0) {
            return self.tx_power_dbm;
        }
        self.mean_rssi(distance) + gaussian(self.noise_std_db, rng)
    }
}

/// Explicit-parameter form of [`PropagationModel::rssi`]
pub fn rssi<R: Rng + ?Sized>(
    distance: f64,
    tx_power_dbm: f64,
    path_loss_exponent: f64,
    reference_loss_db: f64,
    noise_std_db: f64,
    variant: PathLossVariant,
    rng: &mut R,
) -> f64 {
    PropagationModel {
        variant,
        tx_power_dbm,
        path_loss_exponent,
        reference_loss_db,
        noise_std_db,
    }
    .rssi(distance, rng)
}

/// Zero-mean normal draw; `std_dev == 0` leaves the RNG untouched
pub(crate) fn gaussian<R: Rng + ?Sized>(std_dev: f64, rng: &mut R) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    match Normal::new(0.0, std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => 0.0,
    }
}
