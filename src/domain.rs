//! # `domain` – The static world
//!
//! A [`Domain`] is everything that is fixed for the life of a batch of
//! scenarios: the reef [`Location`] table, the connectivity matrix, a
//! precomputed pairwise distance matrix, per-location connectivity-rank
//! scalars, the strongest-predecessor index per location, and coral species
//! parameters. It is constructed once (§3 "Domain") and never mutated again —
//! every scenario worker only ever takes `&Domain`.
//!
//! `Domain` wraps plain `ndarray` arrays in a transparent struct rather
//! than an opaque handle: it is inspectable, cloneable, and has no hidden
//! state.

use ndarray::{Array1, Array2, Axis};
use thiserror::Error;

use crate::helpers::linalg::cross_euclidean_distances_as_array;

/// Number of species x size-class bins tracked in the coral-cover state
/// (§3 "Coral-cover state").
pub const N_SPECIES_BINS: usize = 36;

/// The fixed, ordered criterion-name list used by the decision-matrix
/// builder (§3: "Column order is deterministic"). Index order here *is* the
/// decision-matrix column order.
pub const CRITERIA_NAMES: [&str; 9] = [
    "in_connectivity",
    "out_connectivity",
    "heat_stress",
    "wave_damage",
    "low_cover",
    "high_cover",
    "seed_priority",
    "shade_priority",
    "available_space",
];

/// Errors raised while assembling a [`Domain`]. Fatal at construction time
/// (§7: "ShapeMismatch ... fatal at Domain construction").
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(
        "shape mismatch building domain: {what} expected {expected:?}, got {actual:?}"
    )]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("connectivity matrix row {row} sums to {sum}, which exceeds 1.0")]
    ConnectivityRowOverflow { row: usize, sum: f64 },
    #[error("domain must have at least one location")]
    EmptyDomain,
}

/// A single reef polygon (§3 "Location (site)").
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub site_id: String,
    pub unique_id: String,
    pub area_m2: f64,
    pub depth_med: f64,
    /// Carrying-capacity fraction k ∈ [0, 1].
    pub k: f64,
    pub centroid: (f64, f64),
}

/// Per size-class coral growth/mortality/fecundity parameters for one
/// species group (§3 "coral species parameter tables").
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesParams {
    pub name: String,
    /// Fecundity per m^2 of colony area, one entry per size-class handled by
    /// this group.
    pub fecundity_per_m2: Vec<f64>,
    pub colony_area_m2: Vec<f64>,
    pub bleach_resistance: f64,
    pub natural_adaptation: f64,
    pub assisted_adaptation: f64,
    /// 90th-percentile wave mortality fraction for this species.
    pub wave_mortality_90: f64,
}

/// Simulation-wide constants that are not per-scenario (§3 "simulation
/// constants").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConstants {
    pub horizon_years: usize,
    pub n_int: usize,
    pub default_seed_start_year: usize,
    pub default_shade_start_year: usize,
    /// Gompertz shape parameters for larval-production attenuation (§4.F
    /// step 1: "LPdhwcoeff, DHWmaxtot, LPDprm2").
    pub lp_dhw_coeff: f64,
    pub dhw_max_tot: f64,
    pub lpd_prm2: f64,
    /// Gompertz shape parameters for bleaching survival (§4.F step 5).
    pub gompertz_p1: f64,
    pub gompertz_p2: f64,
    /// Settlement-probability scalar for recruitment (§4.F step 3).
    pub potential_settler_cover: f64,
    /// Absolute bin indices of the two enhanced out-planting taxa, tabular
    /// and corymbose Acropora, in their size-class-2 slot (§4.F step 7).
    pub enhanced_taxon_bins: [usize; 2],
}

/// The static world shared read-only across every scenario (§3 "Domain").
#[derive(Debug, Clone)]
pub struct Domain {
    pub locations: Vec<Location>,
    /// Row-stochastic transition-probability matrix of larval export,
    /// shape (n_locations, n_locations).
    pub connectivity: Array2<f64>,
    /// Precomputed pairwise centroid distance matrix, shape
    /// (n_locations, n_locations).
    pub distances: Array2<f64>,
    /// Per-location connectivity-rank scalar (row sum of `connectivity`,
    /// i.e. total larval export out of the location — the out-connectivity
    /// criterion raw signal).
    pub connectivity_rank: Array1<f64>,
    /// Strongest-predecessor index per location: the source location that
    /// contributes the largest inflow, i.e. argmax over column l of
    /// `connectivity`.
    pub strongest_predecessor: Vec<usize>,
    pub species: Vec<SpeciesParams>,
    pub constants: SimConstants,
}

impl Domain {
    pub fn n_locations(&self) -> usize {
        self.locations.len()
    }

    /// Contiguous `[start, end)` bin range owned by each species group, in
    /// `species` order. Group `g`'s bins are `fecundity_per_m2.len()` wide.
    pub fn species_bin_ranges(&self) -> Vec<(usize, usize)> {
        let mut ranges = Vec::with_capacity(self.species.len());
        let mut cursor = 0;
        for group in &self.species {
            let width = group.fecundity_per_m2.len();
            ranges.push((cursor, cursor + width));
            cursor += width;
        }
        ranges
    }

    /// The species-group index owning bin `bin`, and its position within
    /// that group.
    pub fn group_for_bin(&self, bin: usize) -> Option<(usize, usize)> {
        self.species_bin_ranges()
            .iter()
            .enumerate()
            .find(|(_, &(start, end))| bin >= start && bin < end)
            .map(|(g, &(start, _))| (g, bin - start))
    }

    pub fn colony_area_for_bin(&self, bin: usize) -> f64 {
        self.group_for_bin(bin)
            .map(|(g, local)| self.species[g].colony_area_m2[local])
            .unwrap_or(0.0)
    }

    /// Median of all off-diagonal pairwise distances, used by the
    /// spatial-spread filter to derive `d_min` from a fraction (§4.C).
    pub fn median_pairwise_distance(&self) -> f64 {
        let n = self.n_locations();
        let mut offdiag: Vec<f64> = Vec::with_capacity(n * n.saturating_sub(1));
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    offdiag.push(self.distances[[i, j]]);
                }
            }
        }
        if offdiag.is_empty() {
            return 0.0;
        }
        offdiag.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mid = offdiag.len() / 2;
        if offdiag.len() % 2 == 0 {
            (offdiag[mid - 1] + offdiag[mid]) / 2.0
        } else {
            offdiag[mid]
        }
    }

    /// Assembles a `Domain` from the external-interface input shapes named
    /// in §6: a location table, a connectivity matrix, and species
    /// parameters. Centroids feed `cross_euclidean_distances_as_array` to
    /// populate the distance matrix.
    pub fn new(
        locations: Vec<Location>,
        connectivity: Array2<f64>,
        species: Vec<SpeciesParams>,
        constants: SimConstants,
    ) -> Result<Self, DomainError> {
        let n = locations.len();
        if n == 0 {
            return Err(DomainError::EmptyDomain);
        }
        if connectivity.shape() != [n, n] {
            return Err(DomainError::ShapeMismatch {
                what: "connectivity matrix",
                expected: (n, n),
                actual: (connectivity.nrows(), connectivity.ncols()),
            });
        }
        for (row, row_view) in connectivity.axis_iter(Axis(0)).enumerate() {
            let sum: f64 = row_view.sum();
            if sum > 1.0 + 1e-9 {
                return Err(DomainError::ConnectivityRowOverflow { row, sum });
            }
        }

        let centroids = Array2::from_shape_fn((n, 2), |(i, c)| {
            if c == 0 {
                locations[i].centroid.0
            } else {
                locations[i].centroid.1
            }
        });
        let distances = cross_euclidean_distances_as_array(&centroids, &centroids).mapv(f64::sqrt);

        let connectivity_rank = connectivity.sum_axis(Axis(1));

        let strongest_predecessor = (0..n)
            .map(|l| {
                let col = connectivity.column(l);
                col.iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                    .map(|(idx, _)| idx)
                    .unwrap_or(l)
            })
            .collect();

        Ok(Self {
            locations,
            connectivity,
            distances,
            connectivity_rank,
            strongest_predecessor,
            species,
            constants,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_location(id: &str, x: f64, y: f64, k: f64) -> Location {
        Location {
            site_id: id.to_string(),
            unique_id: id.to_string(),
            area_m2: 100.0,
            depth_med: 5.0,
            k,
            centroid: (x, y),
        }
    }

    fn toy_constants() -> SimConstants {
        SimConstants {
            horizon_years: 10,
            n_int: 3,
            default_seed_start_year: 2,
            default_shade_start_year: 2,
            lp_dhw_coeff: 0.4,
            dhw_max_tot: 8.0,
            lpd_prm2: 0.3,
            gompertz_p1: 3.0,
            gompertz_p2: 0.3,
            potential_settler_cover: 0.001,
            enhanced_taxon_bins: [0, 1],
        }
    }

    #[test]
    fn test_domain_new_rejects_empty() {
        let err = Domain::new(vec![], Array2::zeros((0, 0)), vec![], toy_constants());
        assert!(matches!(err, Err(DomainError::EmptyDomain)));
    }

    #[test]
    fn test_domain_new_rejects_shape_mismatch() {
        let locs = vec![toy_location("a", 0.0, 0.0, 0.5), toy_location("b", 1.0, 0.0, 0.5)];
        let bad = Array2::zeros((3, 3));
        let err = Domain::new(locs, bad, vec![], toy_constants());
        assert!(matches!(err, Err(DomainError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_domain_new_rejects_overflowing_row() {
        let locs = vec![toy_location("a", 0.0, 0.0, 0.5), toy_location("b", 1.0, 0.0, 0.5)];
        let conn = ndarray::array![[0.6, 0.6], [0.0, 0.0]];
        let err = Domain::new(locs, conn, vec![], toy_constants());
        assert!(matches!(err, Err(DomainError::ConnectivityRowOverflow { row: 0, .. })));
    }

    #[test]
    fn test_median_pairwise_distance_three_sites() {
        let locs = vec![
            toy_location("a", 0.0, 0.0, 0.5),
            toy_location("b", 3.0, 0.0, 0.5),
            toy_location("c", 3.0, 4.0, 0.5),
        ];
        let conn = Array2::zeros((3, 3));
        let domain = Domain::new(locs, conn, vec![], toy_constants()).unwrap();
        // Distances: a-b=3, a-c=5, b-c=4 -> median = 4
        assert!((domain.median_pairwise_distance() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_strongest_predecessor() {
        let locs = vec![
            toy_location("a", 0.0, 0.0, 0.5),
            toy_location("b", 1.0, 0.0, 0.5),
            toy_location("c", 2.0, 0.0, 0.5),
        ];
        // Location 2's strongest inflow comes from location 0 (0.9 vs 0.1 from 1).
        let conn = ndarray::array![
            [0.0, 0.1, 0.9],
            [0.0, 0.0, 0.1],
            [0.0, 0.0, 0.0],
        ];
        let domain = Domain::new(locs, conn, vec![], toy_constants()).unwrap();
        assert_eq!(domain.strongest_predecessor[2], 0);
    }
}
