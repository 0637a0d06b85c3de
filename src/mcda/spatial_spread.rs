//! # `spatial_spread` – Component C: enforce minimum pairwise distance
//!
//! Re-ranks a ranker's top `n_int` picks so that no two selected sites sit
//! closer than `d_min`, falling back to a best-effort result when the
//! candidate pool cannot satisfy the constraint (§4.C). Distances are read
//! from [`crate::domain::Domain::distances`], the `faer`-backed
//! pairwise-distance matrix built by
//! `helpers::linalg::cross_euclidean_distances`.

use ndarray::Array2;

use crate::mcda::ranker::RankedSite;

/// Outcome of the spread filter: the selected location ids (length
/// `n_int`, zero-padded if fewer candidates were available) and whether the
/// constraint was fully satisfied.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadResult {
    pub sites: Vec<usize>,
    /// `true` when every pair in `sites` satisfies `d_min`; `false` means a
    /// best-effort fallback was used (§7 DegenerateDistanceSort).
    pub satisfied: bool,
}

/// Applies the 6-step algorithm in §4.C to a ranker's output.
///
/// Location ids are 1-based (§3: "Locations are indexed 1..N_loc"; 0 is the
/// "not considered" sentinel), so `distances` — which is 0-indexed like
/// every other `Domain` array — is addressed via `id - 1`.
pub fn apply(
    ranked: &[RankedSite],
    n_int: usize,
    distances: &Array2<f64>,
    d_min: f64,
    top_n: usize,
) -> SpreadResult {
    let take = n_int.min(ranked.len());
    let mut pref: Vec<usize> = ranked[..take].iter().map(|r| r.location_id).collect();
    pref.resize(n_int, 0);

    let conflicts = |sites: &[usize]| -> Vec<usize> {
        let mut offending = Vec::new();
        for i in 0..sites.len() {
            if sites[i] == 0 {
                continue;
            }
            for j in 0..sites.len() {
                if i == j || sites[j] == 0 {
                    continue;
                }
                if distances[[sites[i] - 1, sites[j] - 1]] < d_min {
                    offending.push(i);
                    break;
                }
            }
        }
        offending
    };

    let mut offending = conflicts(&pref);
    if offending.is_empty() {
        return SpreadResult { sites: pref, satisfied: true };
    }

    let mut alt_sites: std::collections::VecDeque<usize> = ranked
        .iter()
        .skip(take)
        .take(top_n)
        .map(|r| r.location_id)
        .filter(|id| !pref.contains(id))
        .collect();

    loop {
        offending = conflicts(&pref);
        if offending.is_empty() {
            return SpreadResult { sites: pref, satisfied: true };
        }
        // "lowest-ranked offending entry" = worst rank among offenders,
        // i.e. the largest position index since `pref` is rank-ordered
        // best-first.
        let worst_pos = *offending.iter().max().unwrap();
        match alt_sites.pop_front() {
            Some(candidate) => pref[worst_pos] = candidate,
            None => break,
        }
    }

    // Alt pool exhausted and a conflict remains: best-effort fallback.
    SpreadResult { sites: pref, satisfied: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ranked(ids: &[usize]) -> Vec<RankedSite> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| RankedSite { location_id: id, score: (ids.len() - i) as f64, rank: i + 1 })
            .collect()
    }

    #[test]
    fn test_no_conflict_returns_unchanged() {
        // Five far-apart sites.
        let d = array![
            [0.0, 10.0, 10.0, 10.0, 10.0],
            [10.0, 0.0, 10.0, 10.0, 10.0],
            [10.0, 10.0, 0.0, 10.0, 10.0],
            [10.0, 10.0, 10.0, 0.0, 10.0],
            [10.0, 10.0, 10.0, 10.0, 0.0],
        ];
        let r = ranked(&[1, 2, 3, 4, 5]);
        let result = apply(&r, 3, &d, 1.0, 5);
        assert!(result.satisfied);
        assert_eq!(result.sites, vec![1, 2, 3]);
    }

    #[test]
    fn test_distance_sort_drops_two_near_neighbors() {
        // §8 scenario 4: sites 1-2 are within d_min, site 3 is far from all.
        // Ranking order (1,2,3,4,5); n_int=3, top_n=5.
        // Expected final prefs: {1, 3, 4}.
        let d = array![
            //   1    2    3    4    5   (row/col i holds id i+1)
            [0.0, 0.5, 10.0, 10.0, 10.0],
            [0.5, 0.0, 10.0, 10.0, 10.0],
            [10.0, 10.0, 0.0, 10.0, 10.0],
            [10.0, 10.0, 10.0, 0.0, 2.0],
            [10.0, 10.0, 10.0, 2.0, 0.0],
        ];
        let r = ranked(&[1, 2, 3, 4, 5]);
        let result = apply(&r, 3, &d, 1.0, 5);
        assert!(result.satisfied);
        let mut sites = result.sites.clone();
        sites.sort();
        assert_eq!(sites, vec![1, 3, 4]);
    }

    #[test]
    fn test_degraded_when_pool_exhausted() {
        // Every site within d_min of every other: no replacement can help.
        let d = Array2::<f64>::from_elem((4, 4), 0.1);
        let r = ranked(&[1, 2, 3, 4]);
        let result = apply(&r, 3, &d, 1.0, 1);
        assert!(!result.satisfied);
        assert_eq!(result.sites.len(), 3);
    }

    #[test]
    fn test_zero_padding_when_fewer_candidates_than_n_int() {
        let d = Array2::<f64>::zeros((2, 2));
        let r = ranked(&[1, 2]);
        let result = apply(&r, 3, &d, 1.0, 2);
        assert_eq!(result.sites.len(), 3);
        assert!(result.sites.contains(&0));
    }
}
