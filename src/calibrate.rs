use crate::error::{Result, TrackingError};
use crate::num::{Number, Point3, Vector3};
use crate::solver::orthogonal_axis;
use crate::tool::ToolModel;

use itertools::Itertools;
use log::info;

mod consts {
    pub const MIN_POINTS: usize = 3;
    pub const CALIBRATED_MIN_VISIBLE: usize = 3;
    pub const MIN_NORM: f64 = 1e-6;
}

/// Derives a tool's local marker layout from a single observation of all of
/// its markers.
///
/// The frame is anchored on the first point. +X points at the marker farthest
/// from it, and the marker spanning the largest triangle with those two fixes
/// the XY plane.
pub struct ToolCalibrator<'a> {
    pub observed: &'a [Point3],
    /// The model being replaced, if any; its identifier, tolerance and
    /// low-pass factors carry over.
    pub previous: Option<&'a ToolModel>,
}

impl<'a> ToolCalibrator<'a> {
    pub fn calibrate(&self, identifier: &str) -> Result<ToolModel> {
        let points = self.observed;
        if points.len() < consts::MIN_POINTS {
            return Err(TrackingError::CalibrationInsufficientPoints(points.len()));
        }

        let p0 = points[0];
        let (idx1, _) = points
            .iter()
            .map(|p| (p - p0).norm_squared())
            .enumerate()
            .fold((0, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        let p1 = points[idx1];

        let (idx2, _) = points
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx1)
            .map(|(i, p)| (i, (p - p0).cross(&(p1 - p0)).norm()))
            .fold((0, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        let p2 = points[idx2];

        let (ex, ey, ez) = orthonormal_frame(&(p1 - p0), &(p2 - p0));

        let locals = points
            .iter()
            .map(|p| {
                let w = p - p0;
                Point3::new(w.dot(&ex), w.dot(&ey), w.dot(&ez))
            })
            .collect_vec();

        let mut model = ToolModel::new(identifier, locals)?;
        if let Some(previous) = self.previous {
            model = model
                .with_match_tolerance(previous.match_tolerance())?
                .with_lowpass(previous.lowpass())?;
        }
        let model = model.with_min_visible(consts::CALIBRATED_MIN_VISIBLE)?;

        info!(
            "calibrated {} from {} markers",
            model.identifier(),
            model.points().len()
        );
        for (i, p) in model.points().iter().enumerate() {
            info!("  {}: ({:.4}, {:.4}, {:.4})", i, p.x, p.y, p.z);
        }

        Ok(model)
    }
}

/// Right-handed orthonormal basis with X along `x_dir` and Y in the plane of
/// `x_dir` and `plane_dir`.
fn orthonormal_frame(x_dir: &Vector3, plane_dir: &Vector3) -> (Vector3, Vector3, Vector3) {
    let ex = x_dir
        .try_normalize(Number::EPSILON)
        .unwrap_or_else(Vector3::x);

    let remainder = plane_dir - ex * plane_dir.dot(&ex);
    let ey = remainder
        .try_normalize(consts::MIN_NORM)
        .unwrap_or_else(|| orthogonal_axis(&ex));

    let ez = ex.cross(&ey).normalize();
    let ey = ez.cross(&ex).normalize();
    (ex, ey, ez)
}
