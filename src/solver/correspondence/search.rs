use super::super::base::Solver;
use super::super::common::pairwise_distances;
use super::enumerate::{candidate_count, for_each_combination, for_each_permutation};
use crate::num::{Number, Point3};

use itertools::Itertools;
use log::warn;
use nalgebra::DMatrix;

mod consts {
    /// Above this many candidate evaluations a single search stops being
    /// cheap enough for a per-frame budget.
    pub const LARGE_SEARCH: u128 = 1_000_000;
}

/// Model marker `model_indices[i]` is matched to observation
/// `observed_indices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Correspondence {
    pub model_indices: Vec<usize>,
    pub observed_indices: Vec<usize>,
    /// Sum over matched pairs of the pairwise-distance disagreement.
    pub cost: Number,
}

impl Correspondence {
    #[inline]
    pub fn len(&self) -> usize {
        self.model_indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.model_indices.is_empty()
    }

    /// A single matched marker has no pairwise distance to check, so its
    /// zero cost says nothing about the geometry.
    #[inline]
    pub fn is_geometrically_validated(&self) -> bool {
        self.len() >= 2
    }

    pub fn matched_points(&self, model: &[Point3], observed: &[Point3]) -> (Vec<Point3>, Vec<Point3>) {
        let model = self.model_indices.iter().map(|&i| model[i]).collect_vec();
        let observed = self.observed_indices.iter().map(|&j| observed[j]).collect_vec();
        (model, observed)
    }
}

/// Exhaustive search for the marker pairing whose pairwise distances agree
/// best, over every subset size from `min_visible` to `min(m, o)`.
///
/// Candidates are visited by subset size, then model combination, then
/// observation arrangement, all ascending; only a strictly lower cost
/// replaces the incumbent. The work is O(k! * C(m, k) * C(o, k)) per size,
/// which limits this to small marker counts.
pub struct CorrespondenceSearch<'a> {
    pub model: &'a [Point3],
    pub observed: &'a [Point3],

    pub min_visible: usize,
}

impl<'a> Solver<Option<Correspondence>> for CorrespondenceSearch<'a> {
    fn solve(self, _: usize) -> Option<Correspondence> {
        let m = self.model.len();
        let o = self.observed.len();
        let max_use = m.min(o);
        if m == 0 || o == 0 || self.min_visible > max_use {
            return None;
        }
        let min_use = self.min_visible.max(1);

        let candidates: u128 = (min_use..=max_use)
            .map(|k| candidate_count(m, o, k))
            .fold(0, u128::saturating_add);
        if candidates > consts::LARGE_SEARCH {
            warn!(
                "correspondence search over {} model and {} observed markers visits {} candidates",
                m, o, candidates
            );
        }

        let model_distances = pairwise_distances(self.model);
        let observed_distances = pairwise_distances(self.observed);

        let mut best: Option<Correspondence> = None;
        for k in min_use..=max_use {
            for_each_combination(m, k, |model_subset| {
                for_each_permutation(o, k, |observed_arrangement| {
                    let cost = distance_cost(
                        &model_distances,
                        &observed_distances,
                        model_subset,
                        observed_arrangement,
                    );
                    if best.as_ref().map_or(true, |b| cost < b.cost) {
                        best = Some(Correspondence {
                            model_indices: model_subset.to_vec(),
                            observed_indices: observed_arrangement.to_vec(),
                            cost,
                        });
                    }
                });
            });
        }
        best
    }
}

#[inline]
fn distance_cost(
    model_distances: &DMatrix<Number>,
    observed_distances: &DMatrix<Number>,
    model_subset: &[usize],
    observed_arrangement: &[usize],
) -> Number {
    let k = model_subset.len();
    let mut cost = 0.0;
    for a in 0..k {
        for b in (a + 1)..k {
            let dm = model_distances[(model_subset[a], model_subset[b])];
            let dobs = observed_distances[(observed_arrangement[a], observed_arrangement[b])];
            cost += (dm - dobs).abs();
        }
    }
    cost
}
