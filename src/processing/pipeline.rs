//! Per-step measurement generation and history keeping

use crate::core::{Anchor, AnchorId, Measurement, Point2D, MIN_MEASURABLE_DISTANCE_M};
use crate::processing::noise::MeasurementNoiseModel;
use crate::processing::propagation::PropagationModel;
use crate::validation::{SimResult, SimulationError};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do when range noise drives a distance to zero or below
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeDistancePolicy {
    /// Raise the distance to `MIN_MEASURABLE_DISTANCE_M` and mark it clamped
    #[default]
    Clamp,
    /// Keep the raw value and mark it; the propagation model then reports tx power
    Flag,
    /// Fail the step before anything is recorded
    Reject,
}

/// Range noise settings applied before the propagation model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementConfig {
    /// Standard deviation of the range error (m)
    pub distance_noise_std_m: f64,
    #[serde(default)]
    pub negative_distance_policy: NegativeDistancePolicy,
}

/// True distance → noisy distance → RSSI, once per anchor per step
#[derive(Debug, Clone)]
pub struct MeasurementPipeline {
    noise: MeasurementNoiseModel,
    propagation: PropagationModel,
    policy: NegativeDistancePolicy,
    histories: BTreeMap<AnchorId, Vec<Measurement>>,
    steps_recorded: u64,
}

impl MeasurementPipeline {
    pub fn new(
        noise: MeasurementNoiseModel,
        propagation: PropagationModel,
        policy: NegativeDistancePolicy,
    ) -> Self {
        Self {
            noise,
            propagation,
            policy,
            histories: BTreeMap::new(),
            steps_recorded: 0,
        }
    }

    pub fn from_config(config: &MeasurementConfig, propagation: PropagationModel) -> SimResult<Self> {
        propagation.validate()?;
        let noise = MeasurementNoiseModel::new(config.distance_noise_std_m)?;
        Ok(Self::new(noise, propagation, config.negative_distance_policy))
    }

    /// Start empty histories for `anchors` so lookups succeed before the first step
    pub fn register(&mut self, anchors: &[Anchor]) {
        for anchor in anchors {
            self.histories.entry(anchor.id).or_default();
        }
    }

    pub fn propagation(&self) -> &PropagationModel {
        &self.propagation
    }

    /// Produce one measurement per anchor, in anchor order, and record them
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        step: u64,
        mobile_position: &Point2D,
        anchors: &[Anchor],
        rng: &mut R,
    ) -> SimResult<Vec<Measurement>> {
        let measurements = self.measure(step, mobile_position, anchors, rng)?;
        self.record(&measurements);
        Ok(measurements)
    }

    /// Compute a step's measurements without touching the histories
    ///
    /// A rejected distance fails the whole step, so nothing partial is ever
    /// handed to [`record`](Self::record).
    pub fn measure<R: Rng + ?Sized>(
        &self,
        step: u64,
        mobile_position: &Point2D,
        anchors: &[Anchor],
        rng: &mut R,
    ) -> SimResult<Vec<Measurement>> {
        let mut measurements = Vec::with_capacity(anchors.len());

        for anchor in anchors {
            let true_distance = anchor.position.distance_to(mobile_position);
            let raw = self.noise.noisy_distance(true_distance, rng);
            let (noisy_distance, clamped) = self.apply_policy(step, anchor.id, raw)?;
            let rssi_dbm = self.propagation.rssi(noisy_distance, rng);

            measurements.push(Measurement {
                anchor_id: anchor.id,
                step,
                true_distance,
                noisy_distance,
                rssi_dbm,
                clamped,
            });
        }
        Ok(measurements)
    }

    /// Append one step's measurements to the histories
    pub fn record(&mut self, measurements: &[Measurement]) {
        for measurement in measurements {
            self.histories
                .entry(measurement.anchor_id)
                .or_default()
                .push(*measurement);
        }
        self.steps_recorded += 1;

        if let Some(first) = measurements.first() {
            debug!("step {}: {} measurements recorded", first.step, measurements.len());
        }
    }

    fn apply_policy(&self, step: u64, anchor_id: AnchorId, raw: f64) -> SimResult<(f64, bool)> {
        if raw > 0.0 {
            return Ok((raw, false));
        }
        match self.policy {
            NegativeDistancePolicy::Clamp => {
                warn!(
                    "step {}: anchor {} noisy distance {:.3} m clamped to {} m",
                    step, anchor_id, raw, MIN_MEASURABLE_DISTANCE_M
                );
                Ok((MIN_MEASURABLE_DISTANCE_M, true))
            }
            NegativeDistancePolicy::Flag => {
                warn!("step {}: anchor {} noisy distance {:.3} m is not positive", step, anchor_id, raw);
                Ok((raw, true))
            }
            NegativeDistancePolicy::Reject => Err(SimulationError::invalid_measurement(
                Some(anchor_id),
                "noisy_distance",
                raw,
            )),
        }
    }

    /// Number of completed `advance` calls
    pub fn steps_recorded(&self) -> u64 {
        self.steps_recorded
    }

    /// Ordered history of one anchor
    pub fn history(&self, anchor_id: AnchorId) -> Option<&[Measurement]> {
        self.histories.get(&anchor_id).map(|h| h.as_slice())
    }

    pub fn history_len(&self, anchor_id: AnchorId) -> usize {
        self.histories.get(&anchor_id).map_or(0, |h| h.len())
    }

    /// Noisy distances of one anchor in step order
    pub fn distance_series(&self, anchor_id: AnchorId) -> Vec<f64> {
        self.series(anchor_id, |m| m.noisy_distance)
    }

    /// RSSI values of one anchor in step order
    pub fn rssi_series(&self, anchor_id: AnchorId) -> Vec<f64> {
        self.series(anchor_id, |m| m.rssi_dbm)
    }

    fn series(&self, anchor_id: AnchorId, field: impl Fn(&Measurement) -> f64) -> Vec<f64> {
        self.histories
            .get(&anchor_id)
            .map(|h| h.iter().map(field).collect())
            .unwrap_or_default()
    }

    /// Mean RSSI over the last `window` steps of one anchor
    pub fn rolling_rssi_mean(&self, anchor_id: AnchorId, window: usize) -> Option<f64> {
        let history = self.histories.get(&anchor_id)?;
        if window == 0 || history.is_empty() {
            return None;
        }
        let tail = &history[history.len().saturating_sub(window)..];
        Some(tail.iter().map(|m| m.rssi_dbm).sum::<f64>() / tail.len() as f64)
    }

    /// Drop all recorded measurements, keeping registered anchors
    pub fn clear(&mut self) {
        for history in self.histories.values_mut() {
            history.clear();
        }
        self.steps_recorded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::layout::AnchorLayout;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pipeline(sigma_m: f64, policy: NegativeDistancePolicy) -> MeasurementPipeline {
        MeasurementPipeline::new(
            MeasurementNoiseModel::new(sigma_m).unwrap(),
            PropagationModel::default(),
            policy,
        )
    }

    #[test]
    fn test_one_measurement_per_anchor_in_order() {
        let anchors = AnchorLayout::square(10.0).anchors().unwrap();
        let mut p = pipeline(0.2, NegativeDistancePolicy::Clamp);
        let mut rng = StdRng::seed_from_u64(42);

        let out = p.advance(0, &Point2D::new(5.0, 5.0), &anchors, &mut rng).unwrap();
        let ids: Vec<AnchorId> = out.iter().map(|m| m.anchor_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        for m in &out {
            assert!((m.true_distance - 50f64.sqrt()).abs() < 1e-12);
            assert_eq!(m.step, 0);
        }
    }

    #[test]
    fn test_histories_stay_in_lockstep() {
        let anchors = AnchorLayout::circular(Point2D::ORIGIN, 1.0, 8).anchors().unwrap();
        let mut p = pipeline(0.2, NegativeDistancePolicy::Clamp);
        p.register(&anchors);
        let mut rng = StdRng::seed_from_u64(1);

        for k in 0..25u64 {
            let mobile = Point2D::new(3.0 * (k as f64).sin(), 3.0 * (k as f64).cos());
            p.advance(k, &mobile, &anchors, &mut rng).unwrap();
            for anchor in &anchors {
                assert_eq!(p.history_len(anchor.id), k as usize + 1);
                assert_eq!(p.rssi_series(anchor.id).len(), p.distance_series(anchor.id).len());
            }
        }
        assert_eq!(p.steps_recorded(), 25);

        let history = p.history(3).unwrap();
        for (i, m) in history.iter().enumerate() {
            assert_eq!(m.step, i as u64);
        }
    }

    #[test]
    fn test_empty_anchor_set() {
        let mut p = pipeline(0.2, NegativeDistancePolicy::Clamp);
        let mut rng = StdRng::seed_from_u64(1);
        let out = p.advance(0, &Point2D::ORIGIN, &[], &mut rng).unwrap();
        assert!(out.is_empty());
        assert_eq!(p.steps_recorded(), 1);
    }

    #[test]
    fn test_noiseless_rssi_matches_model() {
        let anchors = vec![Anchor::new(1, Point2D::ORIGIN)];
        let mut p = MeasurementPipeline::new(
            MeasurementNoiseModel::default(),
            PropagationModel::default().noiseless(),
            NegativeDistancePolicy::Clamp,
        );
        let mut rng = StdRng::seed_from_u64(0);
        let out = p.advance(0, &Point2D::new(10.0, 0.0), &anchors, &mut rng).unwrap();
        assert_eq!(out[0].noisy_distance, 10.0);
        assert!((out[0].rssi_dbm + 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_policy() {
        let anchors = vec![Anchor::new(1, Point2D::ORIGIN)];
        let mut p = pipeline(0.0, NegativeDistancePolicy::Clamp);
        let mut rng = StdRng::seed_from_u64(0);
        let out = p.advance(0, &Point2D::ORIGIN, &anchors, &mut rng).unwrap();
        assert!(out[0].clamped);
        assert_eq!(out[0].noisy_distance, MIN_MEASURABLE_DISTANCE_M);
        assert_eq!(out[0].true_distance, 0.0);
        assert!(out[0].rssi_dbm.is_finite());
    }

    #[test]
    fn test_flag_policy_reports_tx_power() {
        let anchors = vec![Anchor::new(1, Point2D::ORIGIN)];
        let mut p = MeasurementPipeline::new(
            MeasurementNoiseModel::default(),
            PropagationModel::reference_loss(-3.0, 40.0, 2.0, 2.0),
            NegativeDistancePolicy::Flag,
        );
        let mut rng = StdRng::seed_from_u64(0);
        let out = p.advance(0, &Point2D::ORIGIN, &anchors, &mut rng).unwrap();
        assert!(out[0].clamped);
        assert_eq!(out[0].noisy_distance, 0.0);
        assert_eq!(out[0].rssi_dbm, -3.0);
    }

    #[test]
    fn test_reject_policy_leaves_history_untouched() {
        let anchors = vec![
            Anchor::new(1, Point2D::new(5.0, 0.0)),
            Anchor::new(2, Point2D::ORIGIN),
        ];
        let mut p = pipeline(0.0, NegativeDistancePolicy::Reject);
        p.register(&anchors);
        let mut rng = StdRng::seed_from_u64(0);

        let err = p.advance(0, &Point2D::ORIGIN, &anchors, &mut rng).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidMeasurement { anchor_id: Some(2), .. }));
        assert_eq!(p.history_len(1), 0);
        assert_eq!(p.history_len(2), 0);
        assert_eq!(p.steps_recorded(), 0);
    }

    #[test]
    fn test_rolling_mean() {
        let anchors = vec![Anchor::new(1, Point2D::ORIGIN)];
        let mut p = pipeline(0.0, NegativeDistancePolicy::Clamp);
        let mut rng = StdRng::seed_from_u64(8);
        for step in 0..20 {
            p.advance(step, &Point2D::new(1.0 + step as f64, 0.0), &anchors, &mut rng)
                .unwrap();
        }
        let series = p.rssi_series(1);
        let expected = series[10..].iter().sum::<f64>() / 10.0;
        let mean = p.rolling_rssi_mean(1, 10).unwrap();
        assert!((mean - expected).abs() < 1e-12);

        let all = p.rolling_rssi_mean(1, 500).unwrap();
        assert!((all - series.iter().sum::<f64>() / 20.0).abs() < 1e-12);
        assert!(p.rolling_rssi_mean(1, 0).is_none());
        assert!(p.rolling_rssi_mean(9, 10).is_none());
    }

    #[test]
    fn test_clear() {
        let anchors = vec![Anchor::new(1, Point2D::ORIGIN)];
        let mut p = pipeline(0.1, NegativeDistancePolicy::Clamp);
        let mut rng = StdRng::seed_from_u64(8);
        p.advance(0, &Point2D::new(2.0, 0.0), &anchors, &mut rng).unwrap();
        p.clear();
        assert_eq!(p.history_len(1), 0);
        assert!(p.history(1).is_some());
        assert_eq!(p.steps_recorded(), 0);
    }
}
