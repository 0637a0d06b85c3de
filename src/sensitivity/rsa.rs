//! Regional Sensitivity Analysis (§4.I "RSA"): the same quantile slicing as
//! PAWN, but scoring each slice against its complement (not the full
//! sample) with the k-sample Anderson–Darling statistic.

use ndarray::{Array2, Axis};

use crate::sensitivity::anderson_darling::anderson_darling_ksample;
use crate::sensitivity::slicing::{assign_slices, quantile_boundaries};

/// A single (slice, factor) cell of the RSA output: either the
/// Anderson–Darling statistic, or [`None`] when undefined (§4.I "Slices
/// with < 2 distinct outputs or zero-length complements are marked
/// missing").
pub type RsaCell = Option<f64>;

/// Runs RSA over every factor (column) of `x` against `y`, producing a
/// dense `(n_slices, n_factors)` grid of [`RsaCell`]s, column-normalized
/// (max-scaled) per factor (§4.I "Output is column-normalized S × D").
pub fn rsa(x: &Array2<f64>, y: &[f64], n_slices: usize) -> Vec<Vec<RsaCell>> {
    let n_factors = x.ncols();
    let mut raw: Vec<Vec<RsaCell>> = Vec::with_capacity(n_factors);

    for d in 0..n_factors {
        let column: Vec<f64> = x.column(d).to_vec();
        let boundaries = quantile_boundaries(&column, n_slices);
        let slice_idx = assign_slices(&column, &boundaries);

        let mut factor_cells = Vec::with_capacity(n_slices);
        for s in 1..=n_slices {
            let in_slice: Vec<f64> = y.iter().zip(&slice_idx).filter(|(_, &si)| si == s).map(|(&v, _)| v).collect();
            let out_slice: Vec<f64> = y.iter().zip(&slice_idx).filter(|(_, &si)| si != s).map(|(&v, _)| v).collect();
            if in_slice.is_empty() || out_slice.is_empty() {
                factor_cells.push(None);
                continue;
            }
            factor_cells.push(anderson_darling_ksample(&[&in_slice, &out_slice]));
        }
        raw.push(factor_cells);
    }

    // Column-normalize: for each factor (column), max-scale its non-missing
    // slice values by that factor's own maximum.
    let mut columns: Vec<f64> = vec![0.0; n_factors];
    for (d, cells) in raw.iter().enumerate() {
        columns[d] = cells.iter().filter_map(|c| *c).fold(0.0_f64, f64::max);
    }
    let normalized: Vec<Vec<RsaCell>> = raw
        .into_iter()
        .enumerate()
        .map(|(d, cells)| {
            let max = columns[d];
            cells.into_iter().map(|c| c.map(|v| if max > 0.0 { v / max } else { 0.0 })).collect()
        })
        .collect();

    // Transpose to the `S × D` (slice rows, factor columns) shape.
    let mut out: Vec<Vec<RsaCell>> = vec![vec![None; n_factors]; n_slices];
    for (d, cells) in normalized.into_iter().enumerate() {
        for (s, cell) in cells.into_iter().enumerate() {
            out[s][d] = cell;
        }
    }
    out
}

/// Dense `(n_slices, n_factors)` matrix view of [`rsa`], with missing cells
/// represented as `f64::NAN` for callers that need a plain `Array2`
/// (e.g. for further `ndarray` processing). Prefer [`rsa`] when a caller
/// needs to distinguish "missing" from "computed as zero".
pub fn rsa_matrix(x: &Array2<f64>, y: &[f64], n_slices: usize) -> Array2<f64> {
    let cells = rsa(x, y, n_slices);
    let n_factors = x.ncols();
    let mut out = Array2::<f64>::from_elem((n_slices, n_factors), f64::NAN);
    for (s, row) in cells.iter().enumerate() {
        for (d, cell) in row.iter().enumerate() {
            if let Some(v) = cell {
                out[[s, d]] = *v;
            }
        }
    }
    out
}

/// Number of non-missing cells per factor column, useful for diagnosing a
/// factor whose slices are mostly degenerate.
pub fn coverage(matrix: &Array2<f64>) -> Vec<usize> {
    matrix.axis_iter(Axis(1)).map(|col| col.iter().filter(|v| v.is_finite()).count()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_sensitive_factor_outranks_noise_factor() {
        let n = 300;
        let x = Array2::from_shape_fn((n, 2), |(i, d)| if d == 0 { (i % 10) as f64 } else { ((i * 53) % 97) as f64 });
        let y: Vec<f64> = (0..n).map(|i| (i % 10) as f64).collect();
        let matrix = rsa_matrix(&x, &y, 10);

        let mean_col = |d: usize| -> f64 {
            let col = matrix.column(d);
            let vals: Vec<f64> = col.iter().filter(|v| v.is_finite()).copied().collect();
            if vals.is_empty() { 0.0 } else { vals.iter().sum::<f64>() / vals.len() as f64 }
        };
        assert!(mean_col(0) > mean_col(1));
    }

    #[test]
    fn test_column_normalized_max_is_one() {
        let n = 200;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
        let matrix = rsa_matrix(&x, &y, 10);
        let max = matrix.column(0).iter().filter(|v| v.is_finite()).copied().fold(0.0_f64, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_factor_marks_cells_missing() {
        let n = 50;
        let x = Array2::from_elem((n, 1), 1.0); // constant factor: every value in slice 1
        let y: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let cells = rsa(&x, &y, 5);
        // Only slice 1 has data; the rest have empty in-slice subsets.
        let missing_count = cells.iter().filter(|row| row[0].is_none()).count();
        assert!(missing_count >= 4);
    }
}
