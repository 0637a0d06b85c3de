//! Outcome mapping (§4.I "Outcome map"): for each factor and quantile
//! slice, estimates the mean behavioral-outcome rate and a bootstrap
//! confidence interval around it.
//!
//! "Behavioral" is caller-defined: a binary rule evaluated on
//! column-normalized outputs (§9 Open Question (iii): inherited as-is), so
//! this module takes the already-normalized outputs plus a predicate
//! rather than normalizing internally.

use ndarray::Array2;

use crate::random::RandomGenerator;
use crate::sensitivity::slicing::{assign_slices, quantile_boundaries, quantile_sorted};

/// Default bootstrap resample count (§4.I "default 100 resamples").
pub const DEFAULT_RESAMPLES: usize = 100;
/// Default percentile confidence level (§4.I "95% percentile CI").
pub const DEFAULT_CI: f64 = 0.95;

/// One (slice, factor) cell's behavioral-rate estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeCell {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Balanced-bootstrap resample means: each observation appears exactly
/// `n_resamples` times across the pooled, shuffled working set, which is
/// then cut into `n_resamples` equal chunks (Davison & Hinkley's balanced
/// bootstrap), rather than each resample drawing independently with
/// replacement.
fn balanced_bootstrap_means<R: RandomGenerator>(values: &[f64], n_resamples: usize, rng: &mut R) -> Vec<f64> {
    let n = values.len();
    if n == 0 || n_resamples == 0 {
        return Vec::new();
    }
    let mut pool: Vec<f64> = Vec::with_capacity(n * n_resamples);
    for _ in 0..n_resamples {
        pool.extend_from_slice(values);
    }
    let mut order: Vec<usize> = (0..pool.len()).collect();
    rng.shuffle_vec_usize(&mut order);

    order
        .chunks(n)
        .map(|chunk| chunk.iter().map(|&i| pool[i]).sum::<f64>() / n as f64)
        .collect()
}

fn percentile_ci(mut resample_means: Vec<f64>, ci: f64) -> (f64, f64) {
    resample_means.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let alpha = 1.0 - ci;
    let lower = quantile_sorted(&resample_means, alpha / 2.0);
    let upper = quantile_sorted(&resample_means, 1.0 - alpha / 2.0);
    (lower, upper)
}

/// Runs the outcome map over every factor (column) of `x`, slicing each
/// into `n_slices` quantile bins and estimating the behavioral rate (the
/// fraction of `is_behavioral(y_normalized[i])` within the slice) with a
/// bootstrap CI. Empty slices are `None` (§4.I "Empty cells are missing").
pub fn outcome_map<R: RandomGenerator>(
    x: &Array2<f64>,
    y_normalized: &[f64],
    is_behavioral: impl Fn(f64) -> bool,
    n_slices: usize,
    n_resamples: usize,
    ci: f64,
    rng: &mut R,
) -> Vec<Vec<Option<OutcomeCell>>> {
    let behavioral: Vec<f64> = y_normalized.iter().map(|&v| if is_behavioral(v) { 1.0 } else { 0.0 }).collect();
    let n_factors = x.ncols();

    if behavioral.iter().all(|&v| v == 0.0) {
        log::warn!("outcome_map: no observation satisfies the behavioral predicate, returning an all-missing table");
        return vec![vec![None; n_factors]; n_slices];
    }

    let mut out = vec![vec![None; n_factors]; n_slices];

    for d in 0..n_factors {
        let column: Vec<f64> = x.column(d).to_vec();
        let boundaries = quantile_boundaries(&column, n_slices);
        let slice_idx = assign_slices(&column, &boundaries);

        for s in 1..=n_slices {
            let subset: Vec<f64> = behavioral.iter().zip(&slice_idx).filter(|(_, &si)| si == s).map(|(&v, _)| v).collect();
            if subset.is_empty() {
                continue;
            }
            let mean = subset.iter().sum::<f64>() / subset.len() as f64;
            let resamples = balanced_bootstrap_means(&subset, n_resamples, rng);
            let (lower, upper) = percentile_ci(resamples, ci);
            out[s - 1][d] = Some(OutcomeCell { mean, lower, upper });
        }
    }
    out
}
