//! Order-Sum ranker: the simplest MCDA method, linear and monotone in the
//! weights (§4.B).

use ndarray::Axis;

use super::{McdaRanker, RankedSite, scores_to_ranked};
use crate::mcda::decision_matrix::DecisionMatrix;

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderSumRanker;

impl McdaRanker for OrderSumRanker {
    fn rank(&self, matrix: &DecisionMatrix) -> Vec<RankedSite> {
        let scores = matrix.matrix.sum_axis(Axis(1));
        let scored = matrix
            .location_ids
            .iter()
            .zip(scores.iter())
            .map(|(&id, &s)| (id, s))
            .collect();
        scores_to_ranked(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn matrix(ids: Vec<usize>, data: ndarray::Array2<f64>) -> DecisionMatrix {
        DecisionMatrix {
            location_ids: ids,
            weights: ndarray::Array1::ones(data.ncols()),
            criterion_names: vec!["c1", "c2"][..data.ncols()].to_vec(),
            matrix: data,
        }
    }

    #[test]
    fn test_order_sum_basic() {
        let dm = matrix(vec![1, 2, 3], array![[1.0, 1.0], [1.0, 1.0], [2.0, 2.0]]);
        let ranked = OrderSumRanker.rank(&dm);
        assert_eq!(ranked[0].location_id, 3);
        assert_eq!(ranked[0].rank, 1);
        // site3 > site1 > site2: tied scores break by ascending location_id.
        assert_eq!(ranked[1].location_id, 1);
        assert_eq!(ranked[2].location_id, 2);
    }
}
