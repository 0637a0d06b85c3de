//! # `ranker` – MCDA ranking algorithms
//!
//! Component B. Each algorithm is a small struct implementing the shared
//! [`McdaRanker`] trait, one struct per concrete ranking algorithm.
//! [`by_id`] is the "table keyed by an integer id" registry called for in
//! Design Notes §9.
//!
//! | id | Algorithm | Module |
//! |----|-----------|--------|
//! | 1 | Order-Sum | [`order_sum`] |
//! | 2 | TOPSIS | [`topsis`] |
//! | 3 | VIKOR | [`vikor`] |

mod order_sum;
mod topsis;
mod vikor;

pub use order_sum::OrderSumRanker;
pub use topsis::TopsisRanker;
pub use vikor::VikorRanker;

use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::mcda::decision_matrix::DecisionMatrix;

/// One location's outcome from a ranker: its score and 1-based rank
/// (§4.B: "rank_index = 1 is best").
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSite {
    pub location_id: usize,
    pub score: f64,
    pub rank: usize,
}

/// Shared behaviour for every MCDA ranking algorithm (§4.B).
pub trait McdaRanker {
    /// Ranks every row of `matrix`, best (rank 1) first. Ties are broken by
    /// ascending `location_id` (§4.B: "Ties are broken by stable sort on the
    /// location_id").
    fn rank(&self, matrix: &DecisionMatrix) -> Vec<RankedSite>;
}

/// Raised when a scenario names an MCDA method id outside `{1, 2, 3}`
/// (§7: "UnknownMcdaMethod ... fatal for the scenario").
#[derive(Debug, Error, PartialEq)]
#[error("unknown MCDA method id {0}; expected 1 (OrderSum), 2 (TOPSIS), or 3 (VIKOR)")]
pub struct UnknownMcdaMethod(pub i32);

/// Looks a ranker up by its scenario `alg_ind` (§3).
pub fn by_id(alg_ind: i32) -> Result<Box<dyn McdaRanker>, UnknownMcdaMethod> {
    match alg_ind {
        1 => Ok(Box::new(OrderSumRanker)),
        2 => Ok(Box::new(TopsisRanker)),
        3 => Ok(Box::new(VikorRanker::default())),
        other => Err(UnknownMcdaMethod(other)),
    }
}

/// Sorts `(location_id, score)` pairs descending by score, breaking ties by
/// ascending `location_id`, and assigns 1-based ranks. Shared by every
/// ranker so the tie-break rule (§4.B) only has one implementation.
pub(crate) fn scores_to_ranked(mut scored: Vec<(usize, f64)>) -> Vec<RankedSite> {
    // `OrderedFloat` gives a total order (NaN sorts as greater than
    // everything) so a scenario that produces a NaN score from a
    // degenerate normalization (§7 NumericDegeneracy) still sorts instead
    // of panicking on `partial_cmp().unwrap()`.
    scored.sort_by_key(|&(id, score)| (OrderedFloat(-score), id));
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (location_id, score))| RankedSite {
            location_id,
            score,
            rank: idx + 1,
        })
        .collect()
}
