use crate::num::{Number, Point3, UnitQuaternion, Vector3};

use nalgebra::{Isometry3, Translation3};
use serde::{Deserialize, Serialize};

/// World-from-tool rigid transform. Scale is always 1.
pub type SE3Quat = Isometry3<Number>;

#[inline]
pub fn se3_from_parts(translation: Vector3, rotation: UnitQuaternion) -> SE3Quat {
    SE3Quat::from_parts(Translation3::from(translation), rotation)
}

/// A tracked tool pose as handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub world_from_tool: SE3Quat,
    /// RMS residual of the solve that produced this pose (meters).
    pub rms: Number,
    /// `false` when the pose is held over from an earlier tick.
    pub valid: bool,
}

impl Pose {
    #[inline]
    pub fn position(&self) -> Vector3 {
        self.world_from_tool.translation.vector
    }

    #[inline]
    pub fn rotation(&self) -> UnitQuaternion {
        self.world_from_tool.rotation
    }

    /// Places tool-local points in the world, e.g. to draw the model overlay.
    pub fn model_points_world(&self, local: &[Point3]) -> Vec<Point3> {
        local
            .iter()
            .map(|p| self.world_from_tool.transform_point(p))
            .collect()
    }
}
