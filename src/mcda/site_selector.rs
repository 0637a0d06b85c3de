//! # `site_selector` – Component D: orchestrate A→B→C per intent
//!
//! The single public entry point scenario stepping calls into for a
//! decision year: filters candidates by depth and rotation, builds one
//! [`CandidateRow`] per surviving location from the current `Domain` and
//! cover state, then runs the decision-matrix builder, ranker, and
//! spatial-spread filter once per active intent (seed, shade).
//!
//! Each sub-step is a free function with its own error type, composed
//! here behind one call rather than re-implemented inline.

use log::warn;
use ndarray::Array2;
use thiserror::Error;

use crate::domain::{Domain, CRITERIA_NAMES};
use crate::mcda::decision_matrix::{self, CandidateRow, CriteriaWeights, DecisionMatrixError, ToleranceRule};
use crate::mcda::ranker::{self, McdaRanker, UnknownMcdaMethod};
use crate::mcda::spatial_spread;

/// Per-intent inputs that differ between seeding and shading (§9
/// "Intent-parameterized selection").
pub struct IntentConfig<'a> {
    pub active: bool,
    pub weights: &'a CriteriaWeights,
    pub rules: &'a [ToleranceRule],
    pub alg_ind: i32,
    pub prev_pref_sites: &'a [usize],
}

/// Spatial-spread settings shared by both intents (§3 "spatial-spread
/// settings").
#[derive(Debug, Clone, Copy)]
pub struct SpreadConfig {
    pub enabled: bool,
    pub min_distance_fraction: f64,
    pub top_n: usize,
}

/// Everything [`select`] needs for one decision-year call.
pub struct SiteSelectionInput<'a> {
    pub domain: &'a Domain,
    pub depth_min: f64,
    pub depth_offset: f64,
    pub dhw_t: &'a [f64],
    pub wave_t: &'a [f64],
    /// Cover state Y[t-1], shape (N_SPECIES_BINS, n_locations).
    pub cover: &'a Array2<f64>,
    pub seed: IntentConfig<'a>,
    pub shade: IntentConfig<'a>,
    pub spread: SpreadConfig,
}

/// The new preference vectors and this decision-year's ranking rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    pub pref_seed_sites: Vec<usize>,
    pub pref_shade_sites: Vec<usize>,
    /// Length `n_locations`, indexed by `location_id - 1`; 0 means "not
    /// considered" (§3 "Ranking log").
    pub seed_ranks: Vec<usize>,
    pub shade_ranks: Vec<usize>,
}

/// Fatal error for one scenario (§7: UnknownMcdaMethod is "fatal for the
/// scenario; do not silently default").
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("seed intent: {0}")]
    Seed(#[source] UnknownMcdaMethod),
    #[error("shade intent: {0}")]
    Shade(#[source] UnknownMcdaMethod),
}

fn wave_mortality_90(domain: &Domain) -> f64 {
    if domain.species.is_empty() {
        return 0.0;
    }
    domain.species.iter().map(|s| s.wave_mortality_90).sum::<f64>() / domain.species.len() as f64
}

/// Builds one [`CandidateRow`] per surviving location from `Domain` + cover
/// state (§4.D step 3).
fn build_candidate_rows(domain: &Domain, surviving: &[usize], input: &SiteSelectionInput) -> Vec<CandidateRow> {
    let n_loc = domain.n_locations();
    let wave90 = wave_mortality_90(domain);
    let strongest_predecessor_counts: Vec<f64> = {
        let mut counts = vec![0.0; n_loc];
        for &pred in &domain.strongest_predecessor {
            counts[pred] += 1.0;
        }
        counts
    };

    surviving
        .iter()
        .map(|&idx| {
            let location_id = idx + 1;
            let k = domain.locations[idx].k;
            let cover_frac = if k > 0.0 {
                (input.cover.column(idx).sum() / k).min(1.0)
            } else {
                0.0
            };
            let low_cover = 1.0 - cover_frac;
            let high_cover = cover_frac;
            // `connectivity[source][sink]` is row-stochastic larval export
            // (see `Domain::connectivity`), so a location's outflow is its
            // row sum (`connectivity_rank`) and its inflow is its column sum.
            let out_connectivity = domain.connectivity_rank[idx];
            let in_connectivity = domain.connectivity.column(idx).sum();
            let heat_prob = input.dhw_t.get(idx).copied().unwrap_or(0.0);
            let wave_prob = wave90 * input.wave_t.get(idx).copied().unwrap_or(0.0);
            let seed_priority = strongest_predecessor_counts[idx];
            let shade_priority = in_connectivity;
            let available_space = domain.locations[idx].area_m2 * k * low_cover;

            let mut values = [0.0; CRITERIA_NAMES.len()];
            values[0] = in_connectivity;
            values[1] = out_connectivity;
            values[2] = heat_prob;
            values[3] = wave_prob;
            values[4] = low_cover;
            values[5] = high_cover;
            values[6] = seed_priority;
            values[7] = shade_priority;
            values[8] = available_space;
            CandidateRow { location_id, values }
        })
        .collect()
}

/// Runs §4.A → §4.B → §4.C for one intent. Non-fatal failures
/// (`EmptyCandidateSet`, `NoActiveCriteria`) degrade to a zero-filled
/// result with a warning, per §7.
fn select_intent(
    candidates: &[CandidateRow],
    config: &IntentConfig,
    domain: &Domain,
    spread: &SpreadConfig,
    n_int: usize,
    n_locations: usize,
) -> Result<(Vec<usize>, Vec<usize>), UnknownMcdaMethod> {
    if !config.active {
        return Ok((config.prev_pref_sites.to_vec(), vec![0; n_locations]));
    }

    let matrix = match decision_matrix::build(candidates, config.rules, config.weights) {
        Ok(m) => m,
        Err(DecisionMatrixError::EmptyCandidateSet) => {
            warn!("site selection: risk filter removed every candidate; returning zero-filled prefs");
            return Ok((vec![0; n_int], vec![0; n_locations]));
        }
        Err(DecisionMatrixError::NoActiveCriteria) => {
            warn!("site selection: intent has no active (non-zero-weight) criteria; skipping");
            return Ok((vec![0; n_int], vec![0; n_locations]));
        }
    };

    let ranker = ranker::by_id(config.alg_ind)?;
    let ranked = ranker.rank(&matrix);

    let sites = if spread.enabled {
        let d_min = spread.min_distance_fraction * domain.median_pairwise_distance();
        let result = spatial_spread::apply(&ranked, n_int, &domain.distances, d_min, spread.top_n);
        if !result.satisfied {
            warn!("site selection: spatial-spread constraint could not be fully satisfied; using best-effort set");
        }
        result.sites
    } else {
        let mut sites: Vec<usize> = ranked.iter().take(n_int).map(|r| r.location_id).collect();
        sites.resize(n_int, 0);
        sites
    };

    let mut ranks = vec![0usize; n_locations];
    for r in &ranked {
        if r.location_id >= 1 && r.location_id <= n_locations {
            ranks[r.location_id - 1] = r.rank;
        }
    }

    Ok((sites, ranks))
}

/// Runs §4.D end to end for one decision year.
pub fn select(input: SiteSelectionInput) -> Result<SelectionOutcome, SelectionError> {
    let domain = input.domain;
    let n_loc = domain.n_locations();

    // Step 1: depth filter.
    let max_depth = input.depth_min + input.depth_offset;
    let mut surviving: Vec<usize> = (0..n_loc)
        .filter(|&i| {
            let d = domain.locations[i].depth_med;
            d >= input.depth_min && d <= max_depth
        })
        .collect();
    if surviving.is_empty() {
        warn!("site selection: depth filter removed every location; retaining all locations");
        surviving = (0..n_loc).collect();
    }

    // Step 2: rotation rule.
    let excluded: std::collections::HashSet<usize> = input
        .seed
        .prev_pref_sites
        .iter()
        .chain(input.shade.prev_pref_sites.iter())
        .filter(|&&id| id != 0)
        .map(|&id| id - 1)
        .collect();
    let rotated: Vec<usize> = surviving.iter().copied().filter(|i| !excluded.contains(i)).collect();
    let surviving = if rotated.is_empty() {
        warn!("site selection: rotation rule would empty the candidate set; skipping rotation this year");
        surviving
    } else {
        rotated
    };

    // Step 3: build per-location criteria rows.
    let candidates = build_candidate_rows(domain, &surviving, &input);

    // Step 4: rank + spread per active intent.
    let n_int = domain.constants.n_int;
    let (pref_seed_sites, seed_ranks) =
        select_intent(&candidates, &input.seed, domain, &input.spread, n_int, n_loc)
            .map_err(SelectionError::Seed)?;
    let (pref_shade_sites, shade_ranks) =
        select_intent(&candidates, &input.shade, domain, &input.spread, n_int, n_loc)
            .map_err(SelectionError::Shade)?;

    Ok(SelectionOutcome { pref_seed_sites, pref_shade_sites, seed_ranks, shade_ranks })
}
