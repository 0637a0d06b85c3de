//! # `mcda` – guided site selection
//!
//! Builds a weighted decision matrix from a `Domain` and a scenario's
//! criteria weights ([`decision_matrix`]), ranks it with one of three
//! interchangeable algorithms ([`ranker`]), enforces a minimum pairwise
//! distance between the chosen sites ([`spatial_spread`]), and ties the
//! three together into the per-decision-year entry point ([`site_selector`]).

pub mod decision_matrix;
pub mod ranker;
pub mod site_selector;
pub mod spatial_spread;

pub use decision_matrix::{CandidateRow, CriteriaWeights, DecisionMatrix, DecisionMatrixError, ToleranceOp, ToleranceRule};
pub use ranker::{McdaRanker, RankedSite, UnknownMcdaMethod};
pub use site_selector::{SelectionError, SelectionOutcome, select};
pub use spatial_spread::SpreadResult;
