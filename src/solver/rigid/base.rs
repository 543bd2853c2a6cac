use crate::num::Number;
use crate::pose::SE3Quat;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidResult {
    pub world_from_model: SE3Quat,
    pub rms: Number,
    /// Power iterations spent on the rotation, 0 for closed-form cases.
    pub iterations: usize,
}
