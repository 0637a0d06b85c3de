//! # `decision_matrix` – Assemble, filter, normalize, weight
//!
//! Component A: turns a table of per-location criterion values into the
//! weighted, L2-normalized matrix the rankers in [`crate::mcda::ranker`]
//! consume. Assembles from raw inputs, validates shape, and returns a
//! `Result` with a `thiserror` error rather than panicking.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

use crate::domain::CRITERIA_NAMES;

/// A comparison operator used by a risk-tolerance rule (§4.A step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceOp {
    Lt,
    Le,
    Gt,
    Ge,
}

impl ToleranceOp {
    fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            ToleranceOp::Lt => value < threshold,
            ToleranceOp::Le => value <= threshold,
            ToleranceOp::Gt => value > threshold,
            ToleranceOp::Ge => value >= threshold,
        }
    }
}

/// A single risk-filter rule: keep rows where `criterion op threshold` holds.
#[derive(Debug, Clone)]
pub struct ToleranceRule {
    pub criterion: &'static str,
    pub op: ToleranceOp,
    pub threshold: f64,
}

impl ToleranceRule {
    pub fn new(criterion: &'static str, op: ToleranceOp, threshold: f64) -> Self {
        Self { criterion, op, threshold }
    }
}

/// One candidate location's raw criterion values, keyed by the fixed
/// [`CRITERIA_NAMES`] ordering (§3 "Column order is deterministic").
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub location_id: usize,
    /// One value per entry of `CRITERIA_NAMES`, same order.
    pub values: [f64; CRITERIA_NAMES.len()],
}

impl CandidateRow {
    pub fn get(&self, criterion: &str) -> Option<f64> {
        CRITERIA_NAMES
            .iter()
            .position(|&c| c == criterion)
            .map(|idx| self.values[idx])
    }
}

/// A per-criterion weight vector aligned with [`CRITERIA_NAMES`]; zero means
/// "this criterion never influences ranking" (§4.A step 2 guarantee).
#[derive(Debug, Clone)]
pub struct CriteriaWeights {
    pub weights: [f64; CRITERIA_NAMES.len()],
}

impl CriteriaWeights {
    pub fn new(weights: [f64; CRITERIA_NAMES.len()]) -> Self {
        Self { weights }
    }

    pub fn zero() -> Self {
        Self { weights: [0.0; CRITERIA_NAMES.len()] }
    }

    pub fn set(&mut self, criterion: &str, value: f64) {
        if let Some(idx) = CRITERIA_NAMES.iter().position(|&c| c == criterion) {
            self.weights[idx] = value;
        }
    }
}

/// The weighted, normalized decision matrix produced by [`build`], ready for
/// a ranker in [`crate::mcda::ranker`] (§4.A "Result").
#[derive(Debug, Clone)]
pub struct DecisionMatrix {
    /// Surviving location ids, row-aligned with `matrix`.
    pub location_ids: Vec<usize>,
    /// Shape (n_candidates, n_active_criteria).
    pub matrix: Array2<f64>,
    /// L1-normalized weights, one per active criterion, aligned with
    /// `criterion_names`.
    pub weights: Array1<f64>,
    pub criterion_names: Vec<&'static str>,
}

/// Errors raised while assembling a [`DecisionMatrix`] (§7).
#[derive(Debug, Error, PartialEq)]
pub enum DecisionMatrixError {
    #[error("risk filter removed every candidate location")]
    EmptyCandidateSet,
    #[error("no criterion has a non-zero weight for this intent")]
    NoActiveCriteria,
}

/// Runs §4.A steps 1–4: risk filter, projection, L2 normalization, L1
/// weighting.
pub fn build(
    candidates: &[CandidateRow],
    rules: &[ToleranceRule],
    weights: &CriteriaWeights,
) -> Result<DecisionMatrix, DecisionMatrixError> {
    // Step 1: risk filter.
    let surviving: Vec<&CandidateRow> = candidates
        .iter()
        .filter(|row| {
            rules.iter().all(|rule| {
                row.get(rule.criterion)
                    .map(|v| rule.op.holds(v, rule.threshold))
                    .unwrap_or(true)
            })
        })
        .collect();
    if surviving.is_empty() {
        return Err(DecisionMatrixError::EmptyCandidateSet);
    }

    // Step 2: projection onto criteria with non-zero weight, in the fixed
    // CRITERIA_NAMES order.
    let active_idx: Vec<usize> = (0..CRITERIA_NAMES.len())
        .filter(|&i| weights.weights[i] != 0.0)
        .collect();
    if active_idx.is_empty() {
        return Err(DecisionMatrixError::NoActiveCriteria);
    }
    let criterion_names: Vec<&'static str> = active_idx.iter().map(|&i| CRITERIA_NAMES[i]).collect();

    let n = surviving.len();
    let mut matrix = Array2::<f64>::zeros((n, active_idx.len()));
    for (row, cand) in surviving.iter().enumerate() {
        for (col, &src_idx) in active_idx.iter().enumerate() {
            matrix[[row, col]] = cand.values[src_idx];
        }
    }

    // Step 3: per-criterion L2 normalization.
    for mut col in matrix.axis_iter_mut(Axis(1)) {
        let norm = col.iter().map(|&v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            col.mapv_inplace(|v| v / norm);
        }
        // All-zero column: NumericDegeneracy path (§7), leave as zeros.
    }

    // Step 4: L1-normalize the active weights, then scale each column.
    let raw_active_weights: Vec<f64> = active_idx.iter().map(|&i| weights.weights[i]).collect();
    let weight_sum: f64 = raw_active_weights.iter().map(|w| w.abs()).sum();
    let normalized_weights: Array1<f64> = if weight_sum > 0.0 {
        Array1::from_vec(raw_active_weights.iter().map(|w| w.abs() / weight_sum).collect())
    } else {
        Array1::zeros(raw_active_weights.len())
    };
    for (mut col, &w) in matrix.axis_iter_mut(Axis(1)).zip(normalized_weights.iter()) {
        col.mapv_inplace(|v| v * w);
    }

    let location_ids = surviving.iter().map(|c| c.location_id).collect();
    Ok(DecisionMatrix {
        location_ids,
        matrix,
        weights: normalized_weights,
        criterion_names,
    })
}
