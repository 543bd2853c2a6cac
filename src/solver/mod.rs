mod base;
mod common;
mod correspondence;
mod rigid;

pub use base::Solver;
pub use common::{centroid, orthogonal_axis, pairwise_distances};
pub use correspondence::*;
pub use rigid::*;
