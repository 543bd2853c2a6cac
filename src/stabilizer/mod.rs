//! Turns per-tick raw solves into a steady pose.
//!
//! The stages run in a fixed order: rejection, low-pass, rotation offset,
//! local position offset, Kalman smoothing, screen-delta clamp. Low-pass
//! blends against the last *accepted* pose before offsets, so offsets never
//! accumulate from tick to tick.

mod kalman;
mod projection;

pub use kalman::{PositionKalman, ScalarKalman};
pub use projection::{clamp_screen_delta, PinholeProjection, ScreenProjection};

use crate::config::StabilizerConfig;
use crate::num::{Number, Point3, UnitQuaternion};
use crate::pose::{se3_from_parts, Pose, SE3Quat};
use crate::tool::LowPass;

use log::debug;

mod consts {
    pub const SLERP_EPSILON: f64 = 1e-9;
}

/// Filter memory of one tracked tool.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerState {
    /// Blended pose of the last accepted solve, before offsets.
    pub accepted: SE3Quat,
    /// What was last handed out.
    pub output: SE3Quat,
    pub rms: Number,
}

pub struct PoseStabilizer {
    config: StabilizerConfig,
    lowpass: LowPass,
    rotation_offset: Option<UnitQuaternion>,

    state: Option<StabilizerState>,
    kalman: Option<PositionKalman>,
}

impl PoseStabilizer {
    pub fn new(config: StabilizerConfig, lowpass: LowPass) -> Self {
        let rotation_offset = config.rotation_offset();
        let kalman = config.kalman.map(PositionKalman::new);
        Self {
            config,
            lowpass,
            rotation_offset,
            state: None,
            kalman,
        }
    }

    #[inline]
    pub fn state(&self) -> Option<&StabilizerState> {
        self.state.as_ref()
    }

    #[inline]
    pub fn kalman(&self) -> Option<&PositionKalman> {
        self.kalman.as_ref()
    }

    pub fn set_lowpass(&mut self, lowpass: LowPass) {
        self.lowpass = lowpass;
    }

    /// Forgets every previous pose.
    pub fn reset(&mut self) {
        self.state = None;
        if let Some(kalman) = self.kalman.as_mut() {
            kalman.reset();
        }
    }

    /// The last output, flagged invalid. Used on ticks without a solve.
    pub fn hold(&self) -> Option<Pose> {
        self.state.as_ref().map(|state| Pose {
            world_from_tool: state.output,
            rms: state.rms,
            valid: false,
        })
    }

    /// Runs one accepted-or-rejected solve through the pipeline.
    pub fn update(
        &mut self,
        raw: &SE3Quat,
        rms: Number,
        projection: Option<&dyn ScreenProjection>,
    ) -> Pose {
        // 1. Rejection
        if let (Some(state), Some(threshold)) = (self.state.as_ref(), self.config.reject_rms) {
            if rms.is_nan() || rms > threshold {
                debug!(
                    "rejected solve with rms {:.4} > {:.4}, holding last pose",
                    rms, threshold
                );
                return Pose {
                    world_from_tool: state.output,
                    rms: state.rms,
                    valid: true,
                };
            }
        }

        // 2. Low-pass. The blend source is the last pre-offset pose, not the
        // emitted output; offsets are reapplied below on every tick.
        let accepted = match self.state.as_ref() {
            Some(state) if self.config.lowpass => self.blend(raw, &state.accepted),
            _ => *raw,
        };

        // 3. Static rotation offset
        let rotation = match self.rotation_offset {
            Some(offset) => offset * accepted.rotation,
            None => accepted.rotation,
        };

        // 4. Local position offset
        let mut position = accepted.translation.vector;
        if let Some(offset) = self.config.position_offset {
            position += rotation * offset;
        }

        // 5. Kalman
        if let Some(kalman) = self.kalman.as_mut() {
            position = kalman.filter(&position);
        }

        // 6. Screen-delta clamp
        if let (Some(state), Some(max_pixels), Some(projection)) = (
            self.state.as_ref(),
            self.config.max_screen_delta_pixels,
            projection,
        ) {
            if max_pixels > 0.0 {
                let previous = Point3::from(state.output.translation.vector);
                let current = Point3::from(position);
                position = clamp_screen_delta(projection, &previous, &current, max_pixels).coords;
            }
        }

        let output = se3_from_parts(position, rotation);
        self.state = Some(StabilizerState {
            accepted,
            output,
            rms,
        });

        Pose {
            world_from_tool: output,
            rms,
            valid: true,
        }
    }

    fn blend(&self, new: &SE3Quat, previous: &SE3Quat) -> SE3Quat {
        let position = new
            .translation
            .vector
            .lerp(&previous.translation.vector, self.lowpass.position);
        let t = self.lowpass.rotation;
        // nearly equal rotations have no well-defined slerp axis
        let rotation = new
            .rotation
            .try_slerp(&previous.rotation, t, consts::SLERP_EPSILON)
            .unwrap_or(if t < 0.5 { new.rotation } else { previous.rotation });
        se3_from_parts(position, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KalmanConfig;
    use crate::num::Vector3;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn pose_at(x: Number, yaw: Number) -> SE3Quat {
        se3_from_parts(
            Vector3::new(x, 0.0, 1.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        )
    }

    fn lowpass(position: Number, rotation: Number) -> LowPass {
        LowPass { position, rotation }
    }

    #[test]
    fn test_first_solve_passes_through() {
        let mut stabilizer = PoseStabilizer::new(StabilizerConfig::default(), LowPass::default());
        assert!(stabilizer.hold().is_none());

        let pose = stabilizer.update(&pose_at(0.5, 0.3), 0.01, None);
        assert!(pose.valid);
        assert_eq!(pose.world_from_tool, pose_at(0.5, 0.3));
        assert_eq!(pose.rms, 0.01);
    }

    #[test]
    fn test_rejection_holds_previous() {
        let config = StabilizerConfig {
            reject_rms: Some(0.05),
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config, lowpass(0.0, 0.0));
        let first = stabilizer.update(&pose_at(0.1, 0.0), 0.01, None);
        let state = stabilizer.state().cloned();

        let second = stabilizer.update(&pose_at(0.9, 1.0), 0.5, None);
        assert_eq!(second.world_from_tool, first.world_from_tool);
        assert_eq!(second.rms, first.rms);
        assert_eq!(stabilizer.state().cloned(), state);
    }

    #[test]
    fn test_frozen_position() {
        let config = StabilizerConfig {
            reject_rms: None,
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config, lowpass(1.0, 0.0));
        stabilizer.update(&pose_at(0.1, 0.0), 0.0, None);
        for i in 1..10 {
            let pose = stabilizer.update(&pose_at(0.1 + i as Number, 0.2), 0.0, None);
            assert_eq!(pose.position(), Vector3::new(0.1, 0.0, 1.0));
            assert_relative_eq!(pose.rotation().angle_to(&pose_at(0.0, 0.2).rotation), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_transparent_lowpass() {
        let config = StabilizerConfig {
            reject_rms: None,
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config, lowpass(0.0, 0.0));
        stabilizer.update(&pose_at(0.1, 0.0), 0.0, None);
        let pose = stabilizer.update(&pose_at(0.7, 0.4), 0.3, None);
        assert_relative_eq!(pose.position(), Vector3::new(0.7, 0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(pose.rotation().angle_to(&pose_at(0.0, 0.4).rotation), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_half_blend() {
        let config = StabilizerConfig {
            reject_rms: None,
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config, lowpass(0.5, 0.5));
        stabilizer.update(&pose_at(0.0, 0.0), 0.0, None);
        let pose = stabilizer.update(&pose_at(1.0, 1.0), 0.0, None);
        assert_relative_eq!(pose.position().x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(pose.rotation().angle(), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_offsets_do_not_accumulate() {
        let config = StabilizerConfig {
            reject_rms: None,
            lowpass: true,
            rotation_offset_degrees: Some(Vector3::new(0.0, 0.0, 90.0)),
            position_offset: Some(Vector3::new(0.1, 0.0, 0.0)),
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config, lowpass(0.5, 0.5));

        let raw = se3_from_parts(Vector3::new(1.0, 2.0, 3.0), UnitQuaternion::identity());
        for _ in 0..5 {
            let pose = stabilizer.update(&raw, 0.0, None);
            // yaw offset turns local +X into world +Y
            assert_relative_eq!(pose.position(), Vector3::new(1.0, 2.1, 3.0), epsilon = 1e-12);
            assert_relative_eq!(pose.rotation().angle(), FRAC_PI_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_kalman_smooths_a_step() {
        let config = StabilizerConfig {
            kalman: Some(KalmanConfig {
                process_noise: 1e-4,
                measurement_noise: 1.0,
            }),
            ..StabilizerConfig::passthrough()
        };
        let mut stabilizer = PoseStabilizer::new(config, LowPass::default());
        stabilizer.update(&pose_at(0.0, 0.0), 0.0, None);
        let pose = stabilizer.update(&pose_at(1.0, 0.0), 0.0, None);
        assert!(pose.position().x > 0.0 && pose.position().x < 1.0);
        assert_relative_eq!(pose.position().z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_screen_clamp() {
        let config = StabilizerConfig {
            max_screen_delta_pixels: Some(10.0),
            ..StabilizerConfig::passthrough()
        };
        let camera = PinholeProjection {
            world_from_camera: SE3Quat::identity(),
            fx: 100.0,
            fy: 100.0,
            cx: 0.0,
            cy: 0.0,
        };
        let mut stabilizer = PoseStabilizer::new(config, LowPass::default());
        stabilizer.update(&pose_at(0.0, 0.0), 0.0, Some(&camera));
        // 100 px jump at depth 1
        let pose = stabilizer.update(&pose_at(1.0, 0.0), 0.0, Some(&camera));
        assert_relative_eq!(pose.position(), Vector3::new(0.1, 0.0, 1.0), epsilon = 1e-12);

        // without a projection the stage is skipped
        let pose = stabilizer.update(&pose_at(2.0, 0.0), 0.0, None);
        assert_relative_eq!(pose.position().x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hold_and_reset() {
        let mut stabilizer = PoseStabilizer::new(StabilizerConfig::default(), LowPass::default());
        stabilizer.update(&pose_at(0.3, 0.0), 0.02, None);

        let held = stabilizer.hold().unwrap();
        assert!(!held.valid);
        assert_eq!(held.world_from_tool, pose_at(0.3, 0.0));
        assert_eq!(held.rms, 0.02);

        stabilizer.reset();
        assert!(stabilizer.hold().is_none());
    }

    #[test]
    fn test_nan_rms_is_rejected() {
        let mut stabilizer = PoseStabilizer::new(StabilizerConfig::default(), LowPass::default());
        let first = stabilizer.update(&pose_at(0.2, 0.1), 0.01, None);
        let second = stabilizer.update(&pose_at(0.8, 0.5), Number::NAN, None);
        assert_eq!(second.world_from_tool, first.world_from_tool);
        assert_eq!(second.rms, 0.01);
    }

    #[test]
    fn test_rejection_leaves_kalman_untouched() {
        let config = StabilizerConfig {
            reject_rms: Some(0.05),
            lowpass: true,
            kalman: Some(KalmanConfig::default()),
            ..StabilizerConfig::default()
        };
        let mut stabilizer = PoseStabilizer::new(config.clone(), lowpass(0.3, 0.3));
        let mut reference = PoseStabilizer::new(config, lowpass(0.3, 0.3));

        for (x, yaw) in [(0.0, 0.0), (0.1, 0.05)] {
            stabilizer.update(&pose_at(x, yaw), 0.01, None);
            reference.update(&pose_at(x, yaw), 0.01, None);
        }
        let axes = stabilizer.kalman().and_then(|k| k.axes()).cloned();
        let state = stabilizer.state().cloned();
        assert!(axes.is_some());

        stabilizer.update(&pose_at(3.0, 1.5), 0.4, None);
        assert_eq!(stabilizer.kalman().and_then(|k| k.axes()).cloned(), axes);
        assert_eq!(stabilizer.state().cloned(), state);

        // the next accepted solve continues as if the rejected one never came
        let next = stabilizer.update(&pose_at(0.2, 0.1), 0.01, None);
        let expected = reference.update(&pose_at(0.2, 0.1), 0.01, None);
        assert_eq!(next, expected);
    }
}
