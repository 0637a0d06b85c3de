//! PAWN moment-independent sensitivity index (§4.I "PAWN index").
//!
//! For each factor, slices the input sample into `S` quantile bins and
//! scores how far each slice's conditional output distribution strays from
//! the unconditional one via the Kolmogorov–Smirnov statistic, then
//! summarizes those `S` distances into six scalars per factor.

use ndarray::{Array1, Array2, Array3, Axis};
use ndarray_stats::QuantileExt;

use crate::sensitivity::ks::ks_statistic;
use crate::sensitivity::slicing::{assign_slices, quantile_boundaries};

/// Default number of quantile slices (§4.I "S slice count (default 10)").
pub const DEFAULT_SLICES: usize = 10;

/// The six summary statistics PAWN reports per factor (§4.I step 4).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PawnSummary {
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    pub std: f64,
    pub cv: f64,
}

impl PawnSummary {
    /// Column order matching [`pawn_index`]'s returned matrix.
    pub const COLUMNS: [&'static str; 6] = ["min", "mean", "median", "max", "std", "cv"];

    fn as_array(self) -> [f64; 6] {
        [self.min, self.mean, self.median, self.max, self.std, self.cv]
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Scores one factor column against the full output sample, returning the
/// per-slice KS distances (used directly by [`pawn_index`] and again, on
/// prefix-mean outputs, by [`temporal_pawn`]).
fn slice_ks_distances(column: &[f64], y: &[f64], n_slices: usize) -> Vec<f64> {
    let boundaries = quantile_boundaries(column, n_slices);
    let slice_idx = assign_slices(column, &boundaries);
    (1..=n_slices)
        .filter_map(|s| {
            let subset: Vec<f64> = y.iter().zip(&slice_idx).filter(|(_, &si)| si == s).map(|(&v, _)| v).collect();
            if subset.is_empty() {
                None
            } else {
                Some(ks_statistic(&subset, y))
            }
        })
        .collect()
}

fn summarize(distances: &[f64]) -> PawnSummary {
    if distances.is_empty() {
        return PawnSummary::default();
    }
    let mut arr = Array1::from_vec(distances.to_vec());
    // `QuantileExt::{min,max}` (ndarray-stats) rather than a manual fold,
    // since it is the one piece of this dependency not already duplicated
    // by a native `ndarray` method.
    let min = *arr.min().unwrap();
    let max = *arr.max().unwrap();
    let mean = arr.mean().unwrap_or(0.0);
    let std = arr.std(0.0);
    let mut sorted = distances.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = crate::sensitivity::slicing::quantile_sorted(&sorted, 0.5);
    let cv = if mean != 0.0 { std / mean } else { 0.0 };
    PawnSummary {
        min: finite_or_zero(min),
        mean: finite_or_zero(mean),
        median: finite_or_zero(median),
        max: finite_or_zero(max),
        std: finite_or_zero(std),
        cv: finite_or_zero(cv),
    }
}

/// Runs §4.I steps 1-5 over every factor (column) of `x`.
///
/// `x` is shaped `(N, D)`, `y` has length `N`. Returns one [`PawnSummary`]
/// per factor, in column order.
pub fn pawn_index(x: &Array2<f64>, y: &Array1<f64>, n_slices: usize) -> Vec<PawnSummary> {
    let y_slice = y.as_slice().expect("y must be contiguous");
    (0..x.ncols())
        .map(|d| {
            let column: Vec<f64> = x.column(d).to_vec();
            let distances = slice_ks_distances(&column, y_slice, n_slices);
            summarize(&distances)
        })
        .collect()
}

/// [`pawn_index`] as a dense `(D, 6)` matrix, column order per
/// [`PawnSummary::COLUMNS`].
pub fn pawn_index_matrix(x: &Array2<f64>, y: &Array1<f64>, n_slices: usize) -> Array2<f64> {
    let summaries = pawn_index(x, y, n_slices);
    let mut out = Array2::<f64>::zeros((summaries.len(), 6));
    for (d, summary) in summaries.iter().enumerate() {
        out.row_mut(d).assign(&Array1::from_vec(summary.as_array().to_vec()));
    }
    out
}

/// Temporal PAWN (§4.I "Temporal PAWN"): applies [`pawn_index_matrix`]
/// repeatedly to the prefix-mean of `y_over_time` (shape `(N, T)`) through
/// each time step, producing a `(D, 6, T)` tensor. Each time slice is then
/// column-max-normalized so factors are comparable across summary
/// statistics of very different scale.
pub fn temporal_pawn(x: &Array2<f64>, y_over_time: &Array2<f64>, n_slices: usize) -> Array3<f64> {
    let n = y_over_time.nrows();
    let t_horizon = y_over_time.ncols();
    let d = x.ncols();
    let mut out = Array3::<f64>::zeros((d, 6, t_horizon));

    let mut running_sum = Array1::<f64>::zeros(n);
    for t in 0..t_horizon {
        running_sum = &running_sum + &y_over_time.column(t);
        let prefix_mean = &running_sum / (t as f64 + 1.0);
        let matrix = pawn_index_matrix(x, &prefix_mean, n_slices);

        // Column-normalize this time-slice (max-scale each of the 6 columns
        // across the D factors; §4.I "column-normalized (max-scaled)").
        let mut normalized = matrix;
        for mut col in normalized.axis_iter_mut(Axis(1)) {
            let max = col.iter().copied().fold(0.0_f64, f64::max);
            if max > 0.0 {
                col.mapv_inplace(|v| v / max);
            }
        }
        out.slice_mut(ndarray::s![.., .., t]).assign(&normalized);
    }
    out
}
