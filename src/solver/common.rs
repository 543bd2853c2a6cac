use crate::num::{Number, Point3, Vector3};

use nalgebra::DMatrix;
use num_traits::Zero;

pub fn centroid(points: &[Point3]) -> Vector3 {
    if points.is_empty() {
        return Vector3::zeros();
    }
    sum(points.iter().map(|p| p.coords)) / points.len() as Number
}

/// Symmetric matrix of euclidean distances between every pair of points.
pub fn pairwise_distances(points: &[Point3]) -> DMatrix<Number> {
    let n = points.len();
    let mut distances = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = nalgebra::distance(&points[i], &points[j]);
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    distances
}

/// Some unit vector perpendicular to `v`, built from the world axis least
/// aligned with it.
pub fn orthogonal_axis(v: &Vector3) -> Vector3 {
    let abs = v.abs();
    let helper = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    v.cross(&helper)
        .try_normalize(Number::EPSILON)
        .unwrap_or_else(Vector3::y)
}

#[inline]
fn sum<I, N>(iter: I) -> N
where
    I: Iterator<Item = N>,
    N: Zero,
{
    iter.fold(N::zero(), |acc, x| acc + x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 2.0),
        ];
        assert_relative_eq!(centroid(&points), Vector3::new(2.0 / 3.0, 4.0 / 3.0, 2.0 / 3.0));
        assert_eq!(centroid(&[]), Vector3::zeros());
    }

    #[test]
    fn test_pairwise_distances() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let d = pairwise_distances(&points);
        assert_relative_eq!(d[(0, 1)], 5.0);
        assert_relative_eq!(d[(1, 0)], 5.0);
        assert_relative_eq!(d[(0, 2)], 1.0);
        assert_relative_eq!(d[(2, 2)], 0.0);
    }

    #[test]
    fn test_orthogonal_axis() {
        for v in [Vector3::x(), Vector3::new(0.0, -2.0, 0.0), Vector3::new(1.0, 2.0, 3.0)] {
            let axis = orthogonal_axis(&v);
            assert_relative_eq!(axis.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(axis.dot(&v), 0.0, epsilon = 1e-12);
        }
    }
}
