//! VIKOR ranker — compromise-programming MCDA (§4.B).
//!
//! `v = 0.5` balances group utility (`Sr`) against individual regret (`R`).
//! Either term's denominator (`S_max - S_min` or `R_max - R_min`) can be zero
//! when every location ties on that measure; that term is defined as 0 in
//! that case rather than propagating a NaN (§7 NumericDegeneracy).

use ndarray::Axis;

use super::{McdaRanker, RankedSite, scores_to_ranked};
use crate::mcda::decision_matrix::DecisionMatrix;

#[derive(Debug, Clone, Copy)]
pub struct VikorRanker {
    pub v: f64,
}

impl Default for VikorRanker {
    fn default() -> Self {
        Self { v: 0.5 }
    }
}

impl McdaRanker for VikorRanker {
    fn rank(&self, matrix: &DecisionMatrix) -> Vec<RankedSite> {
        let m = &matrix.matrix;
        if m.nrows() == 0 {
            return Vec::new();
        }

        let f_max = m.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let a = m.mapv(|v| f_max - v);

        let sr = a.sum_axis(Axis(1));
        let r = a.fold_axis(Axis(1), f64::NEG_INFINITY, |&acc, &v| acc.max(v));

        let s_min = sr.iter().cloned().fold(f64::INFINITY, f64::min);
        let s_max = sr.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let r_min = r.iter().cloned().fold(f64::INFINITY, f64::min);
        let r_max = r.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let s_span = s_max - s_min;
        let r_span = r_max - r_min;

        let scored = matrix
            .location_ids
            .iter()
            .enumerate()
            .map(|(idx, &id)| {
                let s_term = if s_span > 0.0 { (sr[idx] - s_min) / s_span } else { 0.0 };
                let r_term = if r_span > 0.0 { (r[idx] - r_min) / r_span } else { 0.0 };
                let q = self.v * s_term + (1.0 - self.v) * r_term;
                (id, 1.0 - q)
            })
            .collect();
        scores_to_ranked(scored)
    }
}
