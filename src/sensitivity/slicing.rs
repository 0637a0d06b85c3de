//! Shared quantile-slicing machinery used by both PAWN ([`super::pawn`]) and
//! RSA ([`super::rsa`]) — §4.I steps 1-2, identical for both procedures.

/// Linear-interpolation quantile over an already-sorted slice (the
/// `numpy`-default "linear" method), used to derive slice boundaries from a
/// factor's empirical distribution.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Quantile boundaries at `0, 1/s, 2/s, ..., 1` for one factor column
/// (§4.I step 1).
pub(crate) fn quantile_boundaries(column: &[f64], n_slices: usize) -> Vec<f64> {
    let mut sorted = column.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    (0..=n_slices).map(|i| quantile_sorted(&sorted, i as f64 / n_slices as f64)).collect()
}

/// Assigns each value in `column` to a 1-based slice index given
/// `boundaries` (length `n_slices + 1`). Slice 1 is left-inclusive,
/// right-inclusive; every other slice is left-exclusive, right-inclusive
/// (§4.I step 2).
pub(crate) fn assign_slices(column: &[f64], boundaries: &[f64]) -> Vec<usize> {
    let n_slices = boundaries.len() - 1;
    column
        .iter()
        .map(|&v| {
            for s in 1..=n_slices {
                let lo = boundaries[s - 1];
                let hi = boundaries[s];
                let in_slice = if s == 1 { v >= lo && v <= hi } else { v > lo && v <= hi };
                if in_slice {
                    return s;
                }
            }
            n_slices
        })
        .collect()
}
