//! Static tracker settings, read-only to the tracking core.
//!
//! Everything here has a tuned default, so a JSON file only needs the fields
//! it changes:
//!
//! ```json
//! {
//!   "target_class": "sphere",
//!   "stabilizer": { "reject_rms": 0.05, "kalman": { "process_noise": 1e-4, "measurement_noise": 1e-2 } }
//! }
//! ```

use std::path::Path;

use crate::error::Result;
use crate::num::{Number, UnitQuaternion, Vector3};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detector label of the tool's markers.
    pub target_class: String,
    /// Label used when calibrating, if it differs from `target_class`.
    pub calibration_class: Option<String>,
    pub solver: SolverConfig,
    pub stabilizer: StabilizerConfig,
    /// Minimum time between pose log lines; `None` disables pose logging.
    pub log_interval_ms: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            target_class: "sphere".into(),
            calibration_class: None,
            solver: SolverConfig::default(),
            stabilizer: StabilizerConfig::default(),
            log_interval_ms: Some(250),
        }
    }
}

impl TrackerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Power-iteration budget of the rotation solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iterations: usize,
    /// Squared change between successive iterates that counts as converged.
    pub epsilon: Number,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 32,
            epsilon: 1e-12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Higher follows motion faster.
    pub process_noise: Number,
    /// Higher smooths more.
    pub measurement_noise: Number,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-4,
            measurement_noise: 1e-2,
        }
    }
}

/// Stages of the pose filter; `None` or `false` switches a stage off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Solves with a larger RMS (meters) are dropped once a pose exists.
    pub reject_rms: Option<Number>,
    /// Blend toward the previous pose using the tool's low-pass factors.
    pub lowpass: bool,
    /// Roll, pitch, yaw in degrees, applied on the left of the solved rotation.
    pub rotation_offset_degrees: Option<Vector3>,
    /// Meters, in the tool's rotated frame.
    pub position_offset: Option<Vector3>,
    pub kalman: Option<KalmanConfig>,
    pub max_screen_delta_pixels: Option<Number>,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            reject_rms: Some(0.2),
            lowpass: true,
            rotation_offset_degrees: None,
            position_offset: None,
            kalman: None,
            max_screen_delta_pixels: None,
        }
    }
}

impl StabilizerConfig {
    /// Every stage off: output equals the raw solve.
    pub fn passthrough() -> Self {
        Self {
            reject_rms: None,
            lowpass: false,
            ..Default::default()
        }
    }

    pub fn rotation_offset(&self) -> Option<UnitQuaternion> {
        self.rotation_offset_degrees.map(|deg| {
            UnitQuaternion::from_euler_angles(deg.x.to_radians(), deg.y.to_radians(), deg.z.to_radians())
        })
    }
}
