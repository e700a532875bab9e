//! Step-driven simulation handle
//!
//! A [`Simulation`] owns everything a run needs: anchors, trajectory,
//! measurement pipeline, estimator, RNG and trail. Callers drive it one step
//! at a time with [`Simulation::advance`] or [`Simulation::step_next`].

use crate::algorithms::direction::DirectionEstimator;
use crate::algorithms::trajectory::TrajectoryGenerator;
use crate::api::types::StepOutput;
use crate::core::{Anchor, AnchorId, Measurement, MobileState, Point2D};
use crate::processing::inertial::InertialSimulator;
use crate::processing::pipeline::MeasurementPipeline;
use crate::utils::config::{SimulationConfig, SimulationOptions};
use crate::validation::{SimResult, SimulationError};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// One configured run
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    anchors: Vec<Anchor>,
    trajectory: TrajectoryGenerator,
    pipeline: MeasurementPipeline,
    estimator: DirectionEstimator,
    inertial: Option<InertialSimulator>,
    rng: StdRng,
    trail: Vec<Point2D>,
    next_step: u64,
}

impl Simulation {
    /// Validate `config` and build a run positioned before step 0
    pub fn configure(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let anchors = config.anchor_layout.anchors()?;
        let trajectory = TrajectoryGenerator::from_config(&config.motion_pattern, config.max_steps)?;
        let mut pipeline = MeasurementPipeline::from_config(&config.measurement, config.propagation)?;
        pipeline.register(&anchors);
        let inertial = match &config.inertial {
            Some(inertial) => Some(InertialSimulator::new(*inertial, config.max_steps)?),
            None => None,
        };

        info!(
            "simulation configured: {} anchors, {} motion, {} steps, seed {}",
            anchors.len(),
            trajectory.pattern_name(),
            config.max_steps,
            config.rng_seed
        );

        Ok(Self {
            estimator: DirectionEstimator::new(config.direction_convention),
            rng: StdRng::seed_from_u64(config.rng_seed),
            trail: Vec::with_capacity(config.max_steps.min(4096) as usize),
            next_step: 0,
            config,
            anchors,
            trajectory,
            pipeline,
            inertial,
        })
    }

    /// Build a run from the flat option set
    pub fn from_options(options: SimulationOptions) -> SimResult<Self> {
        Self::configure(options.into_config()?)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn estimator(&self) -> &DirectionEstimator {
        &self.estimator
    }

    /// Step the next `advance` call must request
    pub fn next_step(&self) -> u64 {
        self.next_step
    }

    pub fn max_steps(&self) -> u64 {
        self.trajectory.max_steps()
    }

    pub fn is_finished(&self) -> bool {
        self.next_step >= self.trajectory.max_steps()
    }

    /// Run one step
    ///
    /// Steps must be requested in order starting at 0. A failed call leaves
    /// the histories, trail and RNG position of completed steps untouched.
    pub fn advance(&mut self, step: i64) -> SimResult<StepOutput> {
        let index = self.trajectory.check_step(step)?;
        if index != self.next_step {
            return Err(SimulationError::invalid_step(
                step,
                format!("expected step {}", self.next_step),
            ));
        }

        let position = self.trajectory.position(step)?;
        let measurements = self.pipeline.measure(index, &position, &self.anchors, &mut self.rng)?;
        let direction = self
            .estimator
            .estimate(index, &position, &self.anchors, &measurements)?;

        self.pipeline.record(&measurements);
        self.trail.push(position);
        self.next_step += 1;

        debug!(
            "step {}: mobile {} bearing {:.1}°",
            index, position, direction.bearing_degrees
        );

        Ok(StepOutput {
            mobile: MobileState { position, step: index },
            measurements,
            direction,
            inertial: self.inertial.as_mut().and_then(|imu| imu.sample(index)),
        })
    }

    /// Advance the next expected step
    pub fn step_next(&mut self) -> SimResult<StepOutput> {
        let step = i64::try_from(self.next_step)
            .map_err(|_| SimulationError::invalid_step(i64::MAX, "step index overflow"))?;
        self.advance(step)
    }

    /// Advance every remaining step
    pub fn run_to_end(&mut self) -> SimResult<Vec<StepOutput>> {
        let remaining = self.max_steps().saturating_sub(self.next_step);
        let mut outputs = Vec::with_capacity(remaining.min(4096) as usize);
        while !self.is_finished() {
            outputs.push(self.step_next()?);
        }
        info!("simulation finished after {} steps", self.next_step);
        Ok(outputs)
    }

    /// Ordered history of one anchor
    pub fn history(&self, anchor_id: AnchorId) -> SimResult<&[Measurement]> {
        self.pipeline
            .history(anchor_id)
            .ok_or(SimulationError::UnknownAnchor { anchor_id })
    }

    /// Mean RSSI over the last `window` steps, `None` before the first step
    pub fn rolling_rssi_mean(&self, anchor_id: AnchorId, window: usize) -> SimResult<Option<f64>> {
        self.history(anchor_id)?;
        Ok(self.pipeline.rolling_rssi_mean(anchor_id, window))
    }

    pub fn steps_recorded(&self) -> u64 {
        self.pipeline.steps_recorded()
    }

    /// The most recent `max_points` true positions, oldest first
    pub fn trail(&self, max_points: usize) -> &[Point2D] {
        &self.trail[self.trail.len().saturating_sub(max_points)..]
    }

    /// Return to step 0 with the RNG reseeded
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.rng_seed);
        self.pipeline.clear();
        self.trail.clear();
        self.next_step = 0;
        debug!("simulation reset to step 0");
    }
}
