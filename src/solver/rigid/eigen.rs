use super::super::base::Solver;
use crate::num::{Matrix4, Number, Vector4};

mod consts {
    pub const MIN_NORM: f64 = 1e-12;
}

/// Dominant eigenvector of a symmetric 4x4 matrix by power iteration.
///
/// The matrix is shifted by its Frobenius norm first, which bounds the
/// spectral radius, so the largest *algebraic* eigenvalue becomes the
/// dominant one. Each iteration squares the shifted operator and
/// renormalizes it: after `i` iterations it holds the `2^i`-th power. Once
/// successive iterates differ by less than `epsilon` (squared Frobenius
/// norm), the largest column is taken as the eigenvector.
///
/// This is an approximation. Nearly tied top eigenvalues may need the full
/// iteration budget, and an exactly tied pair yields some vector of the
/// shared eigenspace.
pub struct PowerIteration<'a> {
    pub matrix: &'a Matrix4,
    pub epsilon: Number,
}

pub struct EigenResult {
    /// Unit length, first component non-negative.
    pub vector: Vector4,
    pub iterations: usize,
}

impl<'a> Solver<EigenResult> for PowerIteration<'a> {
    const MAX_ITER: usize = 32;

    fn solve(self, repeat: usize) -> EigenResult {
        let shift = self.matrix.norm();
        if shift < consts::MIN_NORM {
            return EigenResult {
                vector: Vector4::x(),
                iterations: 0,
            };
        }

        let mut power = (self.matrix + Matrix4::identity() * shift) / (2.0 * shift);
        let mut iterations = 0;
        while iterations < repeat {
            iterations += 1;

            let squared = power * power;
            let norm = squared.norm();
            if norm < consts::MIN_NORM {
                break;
            }
            let next = squared / norm;
            let change = (next - power).norm_squared();
            power = next;
            if change < self.epsilon {
                break;
            }
        }

        let (column, _) = power
            .column_iter()
            .enumerate()
            .map(|(i, c)| (i, c.norm_squared()))
            .fold((0, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        let mut vector: Vector4 = power.column(column).into_owned();
        vector = vector.try_normalize(consts::MIN_NORM).unwrap_or_else(Vector4::x);
        if vector[0] < 0.0 {
            vector = -vector;
        }

        EigenResult { vector, iterations }
    }
}
