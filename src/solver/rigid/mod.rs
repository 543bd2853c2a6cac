mod absolute;
mod base;
mod eigen;

pub use absolute::RigidTransformSolver;
pub use base::RigidResult;
pub use eigen::{EigenResult, PowerIteration};
