//! Two-sample Kolmogorov–Smirnov statistic, the distance measure PAWN
//! (§4.I) scores each quantile slice against the unconditional output
//! sample.

/// `sup|F_sample - F_reference|` evaluated at every distinct value that
/// appears in either sample (the supremum of the ECDF gap is always
/// attained at an observed point, so this is exact, not an approximation).
pub(crate) fn ks_statistic(sample: &[f64], reference: &[f64]) -> f64 {
    if sample.is_empty() || reference.is_empty() {
        return 0.0;
    }
    let mut points: Vec<f64> = sample.iter().chain(reference.iter()).copied().collect();
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());
    points.dedup();

    let n1 = sample.len() as f64;
    let n2 = reference.len() as f64;
    points
        .iter()
        .map(|&x| {
            let f1 = sample.iter().filter(|&&v| v <= x).count() as f64 / n1;
            let f2 = reference.iter().filter(|&&v| v <= x).count() as f64 / n2;
            (f1 - f2).abs()
        })
        .fold(0.0, f64::max)
}

/// The scaled KS statistic `sqrt((n_s*N)/(n_s+N)) * D_s` (§4.I step 3),
/// used for significance testing rather than the index itself (the PAWN
/// summary statistics in §4.I step 4 are computed over the raw `D_s`).
pub(crate) fn scaled_ks_statistic(d: f64, n_slice: usize, n_total: usize) -> f64 {
    let ns = n_slice as f64;
    let n = n_total as f64;
    if ns + n == 0.0 {
        return 0.0;
    }
    ((ns * n) / (ns + n)).sqrt() * d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples_have_zero_distance() {
        let sample = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((ks_statistic(&sample, &sample) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_samples_have_distance_one() {
        let sample = vec![0.0, 0.0, 0.0];
        let reference = vec![1.0, 1.0, 1.0];
        assert!((ks_statistic(&sample, &reference) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sample_is_zero() {
        assert_eq!(ks_statistic(&[], &[1.0, 2.0]), 0.0);
    }
}
