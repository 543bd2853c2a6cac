//! Pose estimation for rigid tools carrying a few tracked spherical markers.
//!
//! Each tick, the world positions of the markers a detector found are matched
//! against the tool's calibrated layout, a least-squares rigid transform is
//! fitted to the matched pairs, and the result is stabilized into a steady
//! pose. [`ToolTracker`] drives one tool through these steps.
//!
//! ```no_run
//! use toolpose::{Observation, Point3, ToolModel, ToolTracker, TrackerConfig};
//!
//! let mut tracker = ToolTracker::new(TrackerConfig::default(), Some(ToolModel::reference_tool()));
//! let observations = vec![
//!     Observation::new("sphere", Some(Point3::new(0.0, 0.0, 1.0))),
//!     Observation::new("sphere", Some(Point3::new(0.074789, 0.0, 1.0))),
//!     Observation::new("sphere", Some(Point3::new(0.025217, 0.034311, 1.0))),
//! ];
//! let tick = tracker.track(&observations, None);
//! if let Some(pose) = tick.pose {
//!     println!("{}", pose.position());
//! }
//! ```

pub mod calibrate;
pub mod config;
pub mod error;
pub mod num;
pub mod pose;
pub mod solver;
pub mod stabilizer;
pub mod tool;
pub mod tracker;

pub use calibrate::ToolCalibrator;
pub use config::{KalmanConfig, SolverConfig, StabilizerConfig, TrackerConfig};
pub use error::{Result, TrackingError};
pub use num::*;
pub use pose::{se3_from_parts, Pose, SE3Quat};
pub use solver::{Correspondence, CorrespondenceSearch, RigidResult, RigidTransformSolver, Solver};
pub use stabilizer::{PinholeProjection, PoseStabilizer, ScreenProjection};
pub use tool::{gather_points, LowPass, Observation, ToolModel};
pub use tracker::{PoseLogger, TickOutput, ToolTracker};
