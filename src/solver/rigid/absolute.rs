use super::super::base::Solver;
use super::super::common::{centroid, orthogonal_axis};
use super::base::RigidResult;
use super::eigen::PowerIteration;
use crate::error::{Result, TrackingError};
use crate::num::{Matrix3, Matrix4, Number, Point3, Quaternion, UnitQuaternion, Vector3};
use crate::pose::{se3_from_parts, SE3Quat};

mod consts {
    pub const DEFAULT_EPSILON: f64 = 1e-12;
}

/// Least-squares rigid motion taking `model` onto `observed`, matched by index.
///
/// Three or more points go through Horn's closed-form absolute orientation
/// (JOSA A 4(4), 1987) with the quaternion eigenvector found by
/// [`PowerIteration`]; `repeat` caps that iteration. One and two points have
/// dedicated closed forms.
pub struct RigidTransformSolver<'a> {
    pub model: &'a [Point3],
    pub observed: &'a [Point3],

    pub epsilon: Number,
}

impl<'a> RigidTransformSolver<'a> {
    pub fn new(model: &'a [Point3], observed: &'a [Point3]) -> Self {
        Self {
            model,
            observed,
            epsilon: consts::DEFAULT_EPSILON,
        }
    }
}

impl<'a> Solver<Result<RigidResult>> for RigidTransformSolver<'a> {
    const MAX_ITER: usize = 32;

    fn solve(self, repeat: usize) -> Result<RigidResult> {
        let n = self.model.len();
        if n == 0 || n != self.observed.len() {
            return Err(TrackingError::SolveDegenerate {
                model: n,
                observed: self.observed.len(),
            });
        }

        match n {
            1 => Ok(RigidResult {
                world_from_model: SE3Quat::translation(
                    self.observed[0].x - self.model[0].x,
                    self.observed[0].y - self.model[0].y,
                    self.observed[0].z - self.model[0].z,
                ),
                rms: 0.0,
                iterations: 0,
            }),
            2 => Ok(self.solve_segment()),
            _ => Ok(self.solve_absolute_orientation(repeat)),
        }
    }
}

impl<'a> RigidTransformSolver<'a> {
    /// Aligns the segment directions; the first model point lands exactly.
    fn solve_segment(&self) -> RigidResult {
        let (m0, m1) = (&self.model[0], &self.model[1]);
        let (o0, o1) = (&self.observed[0], &self.observed[1]);

        let rotation = shortest_arc(&(m1 - m0), &(o1 - o0));
        let translation = o0.coords - rotation * m0.coords;
        let world_from_model = se3_from_parts(translation, rotation);

        let rms = (nalgebra::distance(&(world_from_model * m0), o0)
            + nalgebra::distance(&(world_from_model * m1), o1))
            * 0.5;

        RigidResult {
            world_from_model,
            rms,
            iterations: 0,
        }
    }

    fn solve_absolute_orientation(&self, repeat: usize) -> RigidResult {
        let centroid_model = centroid(self.model);
        let centroid_observed = centroid(self.observed);

        // cross-covariance H = sum (m - cm)(o - co)^T
        let h = self
            .model
            .iter()
            .zip(self.observed.iter())
            .fold(Matrix3::zeros(), |h, (m, o)| {
                h + (m.coords - centroid_model) * (o.coords - centroid_observed).transpose()
            });

        let k = horn_matrix(&h);
        let eigen = PowerIteration {
            matrix: &k,
            epsilon: self.epsilon,
        }
        .solve(repeat);

        let q = eigen.vector;
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(q[0], q[1], q[2], q[3]));
        let translation = centroid_observed - rotation * centroid_model;
        let world_from_model = se3_from_parts(translation, rotation);

        let squared_error: Number = self
            .model
            .iter()
            .zip(self.observed.iter())
            .map(|(m, o)| (world_from_model * m - o).norm_squared())
            .sum();

        RigidResult {
            world_from_model,
            rms: (squared_error / self.model.len() as Number).sqrt(),
            iterations: eigen.iterations,
        }
    }
}

/// Symmetric 4x4 matrix whose dominant eigenvector is the optimal rotation
/// quaternion (w, x, y, z).
fn horn_matrix(h: &Matrix3) -> Matrix4 {
    let (sxx, sxy, sxz) = (h[(0, 0)], h[(0, 1)], h[(0, 2)]);
    let (syx, syy, syz) = (h[(1, 0)], h[(1, 1)], h[(1, 2)]);
    let (szx, szy, szz) = (h[(2, 0)], h[(2, 1)], h[(2, 2)]);

    Matrix4::new(
        sxx + syy + szz,
        syz - szy,
        szx - sxz,
        sxy - syx,
        syz - szy,
        sxx - syy - szz,
        sxy + syx,
        szx + sxz,
        szx - sxz,
        sxy + syx,
        -sxx + syy - szz,
        syz + szy,
        sxy - syx,
        szx + sxz,
        syz + szy,
        -sxx - syy + szz,
    )
}

/// Smallest rotation taking direction `from` onto direction `to`. Opposite
/// directions get a half turn about an axis perpendicular to `from`.
fn shortest_arc(from: &Vector3, to: &Vector3) -> UnitQuaternion {
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_unchecked(orthogonal_axis(from)),
            std::f64::consts::PI,
        )
    })
}
