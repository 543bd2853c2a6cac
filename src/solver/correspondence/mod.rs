mod enumerate;
mod search;

pub use enumerate::{candidate_count, for_each_combination, for_each_permutation};
pub use search::{Correspondence, CorrespondenceSearch};
