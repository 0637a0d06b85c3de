//! Component J: proportional-cover adjuster (§4.J).
//!
//! Enforces the capacity invariant `Σ_s Y[t, s, l] ≤ k_l + ε` after every
//! step by uniformly rescaling any location whose species sum overshoots
//! its carrying capacity.

use ndarray::{Array1, Array2, Axis};

/// Tolerance used by the capacity invariant (§8 "Capacity ... ε = 1e-9").
pub const CAPACITY_EPSILON: f64 = 1e-9;

/// Rescales every location `l` where `Σ_s Y[:, l] > k_l` so the sum equals
/// `k_l` exactly, in place.
pub fn adjust(y: &mut Array2<f64>, k: &Array1<f64>) {
    let col_sums = y.sum_axis(Axis(0));
    for l in 0..y.ncols() {
        let sum = col_sums[l];
        let kl = k[l];
        if sum > kl {
            let scale = if sum > 0.0 { kl / sum } else { 0.0 };
            for s in 0..y.nrows() {
                y[[s, l]] *= scale;
            }
        }
    }
}
