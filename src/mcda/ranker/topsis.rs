//! TOPSIS ranker — distance to the positive/negative ideal solutions
//! (§4.B). Zero-variance columns contribute 0 to both distances, which
//! falls out naturally here since `PIS_c == NIS_c == S[l, c]` for every
//! row in that case.

use ndarray::Axis;

use super::{McdaRanker, RankedSite, scores_to_ranked};
use crate::mcda::decision_matrix::DecisionMatrix;

#[derive(Debug, Clone, Copy, Default)]
pub struct TopsisRanker;

impl McdaRanker for TopsisRanker {
    fn rank(&self, matrix: &DecisionMatrix) -> Vec<RankedSite> {
        let m = &matrix.matrix;
        let n_locations = m.nrows();
        if n_locations == 0 {
            return Vec::new();
        }

        let pis = m.fold_axis(Axis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));
        let nis = m.fold_axis(Axis(0), f64::INFINITY, |&a, &b| a.min(b));

        let scored = matrix
            .location_ids
            .iter()
            .enumerate()
            .map(|(row, &id)| {
                let row_view = m.row(row);
                let s_p = row_view
                    .iter()
                    .zip(pis.iter())
                    .map(|(&v, &p)| (v - p).powi(2))
                    .sum::<f64>()
                    .sqrt();
                let s_n = row_view
                    .iter()
                    .zip(nis.iter())
                    .map(|(&v, &nn)| (v - nn).powi(2))
                    .sum::<f64>()
                    .sqrt();
                let denom = s_p + s_n;
                let score = if denom > 0.0 { s_n / denom } else { 0.0 };
                (id, score)
            })
            .collect();
        scores_to_ranked(scored)
    }
}
