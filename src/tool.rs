use crate::error::{Result, TrackingError};
use crate::num::{Number, Point3};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

mod consts {
    pub const DEFAULT_MIN_VISIBLE: usize = 3;
    pub const DEFAULT_MATCH_TOLERANCE: f64 = 0.03;
    pub const DEFAULT_LOWPASS: f64 = 0.2;
}

/// Temporal blend weights, 0 = take the new estimate, 1 = frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowPass {
    pub position: Number,
    pub rotation: Number,
}

impl Default for LowPass {
    fn default() -> Self {
        Self {
            position: consts::DEFAULT_LOWPASS,
            rotation: consts::DEFAULT_LOWPASS,
        }
    }
}

/// Rigid marker layout of one tool, in the tool's own frame (meters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ToolModelFields")]
pub struct ToolModel {
    identifier: String,
    points: Vec<Point3>,
    min_visible: usize,
    match_tolerance: Number,
    lowpass: LowPass,
}

#[derive(Deserialize)]
struct ToolModelFields {
    identifier: String,
    points: Vec<Point3>,
    #[serde(default)]
    min_visible: Option<usize>,
    #[serde(default = "default_match_tolerance")]
    match_tolerance: Number,
    #[serde(default)]
    lowpass: LowPass,
}

fn default_match_tolerance() -> Number {
    consts::DEFAULT_MATCH_TOLERANCE
}

impl TryFrom<ToolModelFields> for ToolModel {
    type Error = TrackingError;

    fn try_from(fields: ToolModelFields) -> Result<Self> {
        let model = Self::new(fields.identifier, fields.points)?;
        let min_visible = fields.min_visible.unwrap_or(model.min_visible);
        model
            .with_min_visible(min_visible)?
            .with_match_tolerance(fields.match_tolerance)?
            .with_lowpass(fields.lowpass)
    }
}

impl ToolModel {
    pub fn new(identifier: impl Into<String>, points: Vec<Point3>) -> Result<Self> {
        if points.is_empty() {
            return Err(TrackingError::InvalidModel(
                "a tool needs at least one marker".into(),
            ));
        }
        if points.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(TrackingError::InvalidModel(
                "marker coordinates must be finite".into(),
            ));
        }
        let min_visible = consts::DEFAULT_MIN_VISIBLE.min(points.len());
        Ok(Self {
            identifier: identifier.into(),
            points,
            min_visible,
            match_tolerance: consts::DEFAULT_MATCH_TOLERANCE,
            lowpass: LowPass::default(),
        })
    }

    /// Four-sphere reference tool.
    pub fn reference_tool() -> Self {
        Self {
            identifier: "Tool".into(),
            points: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.074789, 0.0, 0.0),
                Point3::new(0.025217, 0.034311, 0.0),
                Point3::new(0.045238, -0.030790, 0.017880),
            ],
            min_visible: consts::DEFAULT_MIN_VISIBLE,
            match_tolerance: consts::DEFAULT_MATCH_TOLERANCE,
            lowpass: LowPass::default(),
        }
    }

    pub fn with_min_visible(mut self, min_visible: usize) -> Result<Self> {
        if min_visible == 0 || min_visible > self.points.len() {
            return Err(TrackingError::InvalidModel(format!(
                "min_visible must lie in [1, {}], got {}",
                self.points.len(),
                min_visible
            )));
        }
        self.min_visible = min_visible;
        Ok(self)
    }

    pub fn with_match_tolerance(mut self, match_tolerance: Number) -> Result<Self> {
        if !(match_tolerance.is_finite() && match_tolerance > 0.0) {
            return Err(TrackingError::InvalidModel(format!(
                "match tolerance must be positive, got {}",
                match_tolerance
            )));
        }
        self.match_tolerance = match_tolerance;
        Ok(self)
    }

    pub fn with_lowpass(mut self, lowpass: LowPass) -> Result<Self> {
        let in_range = |x: Number| (0.0..=1.0).contains(&x);
        if !in_range(lowpass.position) || !in_range(lowpass.rotation) {
            return Err(TrackingError::InvalidModel(format!(
                "low-pass factors must lie in [0, 1], got {:?}",
                lowpass
            )));
        }
        self.lowpass = lowpass;
        Ok(self)
    }

    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[inline]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[inline]
    pub fn min_visible(&self) -> usize {
        self.min_visible
    }

    /// Reserved for exact per-marker matching; the correspondence cost does
    /// not read it.
    #[inline]
    pub fn match_tolerance(&self) -> Number {
        self.match_tolerance
    }

    #[inline]
    pub fn lowpass(&self) -> LowPass {
        self.lowpass
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// One detector output: class label plus the placed world position, if the
/// depth lookup succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub class_name: String,
    pub world_position: Option<Point3>,
}

impl Observation {
    pub fn new(class_name: impl Into<String>, world_position: Option<Point3>) -> Self {
        Self {
            class_name: class_name.into(),
            world_position,
        }
    }
}

/// Placed positions of all observations labeled `class_name`, in input order.
/// Positions with a non-finite coordinate are dropped.
pub fn gather_points(observations: &[Observation], class_name: &str) -> Vec<Point3> {
    observations
        .iter()
        .filter(|o| o.class_name == class_name)
        .filter_map(|o| o.world_position)
        .filter(|p| p.coords.iter().all(|c| c.is_finite()))
        .collect_vec()
}
