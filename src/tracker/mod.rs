//! Per-tick driver for one tracked tool.

mod logger;

pub use logger::PoseLogger;

use std::time::{Duration, Instant};

use crate::calibrate::ToolCalibrator;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackingError};
use crate::pose::Pose;
use crate::solver::{CorrespondenceSearch, RigidResult, RigidTransformSolver, Solver};
use crate::stabilizer::{PoseStabilizer, ScreenProjection};
use crate::tool::{gather_points, Observation, ToolModel};

use log::debug;

mod consts {
    /// Matched markers needed to fix all three rotational degrees of freedom.
    pub const FULL_POSE_MARKERS: usize = 3;
}

/// What one tick produced.
#[derive(Debug)]
pub struct TickOutput {
    /// The stabilized pose, or the held one (`valid == false`) after a failed
    /// tick; `None` until the first successful solve.
    pub pose: Option<Pose>,
    pub failure: Option<TrackingError>,
}

/// Tracks one tool. Independent tools need independent trackers.
pub struct ToolTracker {
    config: TrackerConfig,
    model: Option<ToolModel>,
    stabilizer: PoseStabilizer,
    logger: Option<PoseLogger>,
}

impl ToolTracker {
    pub fn new(config: TrackerConfig, model: Option<ToolModel>) -> Self {
        let lowpass = model.as_ref().map(ToolModel::lowpass).unwrap_or_default();
        let stabilizer = PoseStabilizer::new(config.stabilizer.clone(), lowpass);
        let logger = config
            .log_interval_ms
            .map(|ms| PoseLogger::new(Duration::from_millis(ms)));
        Self {
            config,
            model,
            stabilizer,
            logger,
        }
    }

    #[inline]
    pub fn model(&self) -> Option<&ToolModel> {
        self.model.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn stabilizer(&self) -> &PoseStabilizer {
        &self.stabilizer
    }

    pub fn logger_mut(&mut self) -> Option<&mut PoseLogger> {
        self.logger.as_mut()
    }

    /// Installs a model and drops all filter memory of the previous one.
    pub fn set_model(&mut self, model: ToolModel) {
        self.stabilizer.set_lowpass(model.lowpass());
        self.stabilizer.reset();
        self.model = Some(model);
    }

    /// One tracking tick. A failure never leaks into later ticks; the last
    /// output is held instead.
    pub fn track(
        &mut self,
        observations: &[Observation],
        projection: Option<&dyn ScreenProjection>,
    ) -> TickOutput {
        match self.estimate(observations) {
            Ok(raw) => {
                let pose = self
                    .stabilizer
                    .update(&raw.world_from_model, raw.rms, projection);
                if let (Some(logger), Some(model)) = (self.logger.as_mut(), self.model.as_ref()) {
                    logger.log(Instant::now(), model.identifier(), &pose);
                }
                TickOutput {
                    pose: Some(pose),
                    failure: None,
                }
            }
            Err(failure) => {
                debug!("tick without pose: {}", failure);
                TickOutput {
                    pose: self.stabilizer.hold(),
                    failure: Some(failure),
                }
            }
        }
    }

    /// Raw rigid fit for this tick's observations, before stabilization.
    pub fn estimate(&self, observations: &[Observation]) -> Result<RigidResult> {
        let model = self.model.as_ref().ok_or(TrackingError::MissingModel)?;
        let observed = gather_points(observations, &self.config.target_class);

        let required = model.min_visible().max(1);
        if observed.len() < required {
            return Err(TrackingError::InsufficientObservations {
                required,
                found: observed.len(),
            });
        }

        // smaller subsets win ties, so start where the rotation is determined
        let floor = consts::FULL_POSE_MARKERS
            .min(model.points().len())
            .min(observed.len())
            .max(required);
        let correspondence = CorrespondenceSearch {
            model: model.points(),
            observed: &observed,
            min_visible: floor,
        }
        .solve_to_end()
        .ok_or(TrackingError::NoCorrespondence { min_visible: floor })?;
        if model.points().len() > 1 && !correspondence.is_geometrically_validated() {
            return Err(TrackingError::UnvalidatedMatch {
                markers: model.points().len(),
            });
        }

        let (model_points, observed_points) = correspondence.matched_points(model.points(), &observed);
        let result = RigidTransformSolver {
            model: &model_points,
            observed: &observed_points,
            epsilon: self.config.solver.epsilon,
        }
        .solve(self.config.solver.max_iterations)?;

        debug!(
            "matched {} markers (cost {:.4}), rms {:.4} after {} iterations",
            correspondence.len(),
            correspondence.cost,
            result.rms,
            result.iterations
        );
        Ok(result)
    }

    /// Rebuilds the tool model from the markers visible right now. On failure
    /// the current model stays in place.
    pub fn calibrate(&mut self, observations: &[Observation]) -> Result<&ToolModel> {
        let class_name = self
            .config
            .calibration_class
            .as_deref()
            .unwrap_or(&self.config.target_class);
        let observed = gather_points(observations, class_name);
        let identifier = self
            .model
            .as_ref()
            .map_or("Tool", |m| m.identifier())
            .to_string();
        let model = ToolCalibrator {
            observed: &observed,
            previous: self.model.as_ref(),
        }
        .calibrate(&identifier)?;

        self.stabilizer.set_lowpass(model.lowpass());
        self.stabilizer.reset();
        Ok(&*self.model.insert(model))
    }
}
