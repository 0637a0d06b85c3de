// lib.rs

//! # `reef_mc` – Monte Carlo decision-support engine for coral reef
//! restoration planning
//!
//! Simulates coral population dynamics across many reef sites under
//! sampled climate and intervention scenarios, choosing intervention sites
//! per decision year via a guided ([`mcda`]) or random policy, and
//! supports global sensitivity analysis ([`sensitivity`]) over the
//! resulting Monte Carlo batch.
//!
//! | Module | Role |
//! |--------|------|
//! | [`domain`] | The static world: sites, species, connectivity, constants |
//! | [`mcda`] | Guided site selection (decision matrix, ranker, spatial spread) |
//! | [`scenario`] | Per-scenario time stepping and the parallel batch driver |
//! | [`sensitivity`] | PAWN, RSA and outcome-mapping over a completed batch |
//! | [`config`] | The two environment-driven run knobs |
//! | [`random`] | The seeded RNG abstraction shared by selection and resampling |
//!
//! No binary target ships with this crate; [`run`] and [`select`] are the
//! library entry points a caller (CLI, notebook kernel, web service) wires
//! up around its own data loading and result persistence.

pub mod config;
pub mod domain;
pub mod helpers;
pub mod mcda;
pub mod random;
pub mod scenario;
pub mod sensitivity;

use std::time::SystemTime;

use ndarray::{Array2, Array3};
use thiserror::Error;

use crate::domain::{Domain, DomainError};
use crate::mcda::site_selector::{self, IntentConfig, SelectionError, SelectionOutcome, SiteSelectionInput, SpreadConfig};
use crate::scenario::growth::GrowthIntegrator;
use crate::scenario::params::ScenarioParams;
use crate::scenario::result::{ResultSink, ScenarioResult};
use crate::scenario::runner;

/// Crate-wide error aggregate, folding construction-time and
/// site-selection errors behind one `From`-convertible type. Domain-level
/// errors are fatal per §7 ("Domain-level errors abort the batch");
/// scenario-local errors never reach this type, they are captured inside
/// [`ScenarioResult::failure`] instead.
#[derive(Debug, Error)]
pub enum ReefMcError {
    #[error("domain construction failed: {0}")]
    Domain(#[from] DomainError),
    #[error("site selection failed: {0}")]
    Selection(#[from] SelectionError),
}

/// The result of one [`run`] invocation: the (unchanged, read-only) world
/// plus every scenario's output and the wall-clock time the batch started.
///
/// §6 describes this entry point's return value as "Domain with recorded
/// invocation timestamp" — `Domain` itself carries no such field (it is an
/// immutable description of the world, not a run record), so the timestamp
/// is attached here instead, alongside the batch's actual results.
pub struct RunOutcome<'d> {
    pub domain: &'d Domain,
    pub invoked_at: SystemTime,
    pub results: Vec<ScenarioResult>,
}

/// Runs every row of `params` against `domain`, `reps` environmental
/// replicates deep, using a zeroed climate forcing and initial cover.
///
/// This is the minimal driver envelope §6 names; a caller with its own
/// DHW/wave rasters and initial cover should drive
/// [`scenario::batch::run_batch`] directly instead, which this function
/// wraps.
pub fn run(domain: &Domain, params: &[ScenarioParams], reps: usize) -> RunOutcome<'_> {
    let invoked_at = SystemTime::now();
    let n_loc = domain.n_locations();
    let t_horizon = domain.constants.horizon_years;

    let dhw = Array3::<f64>::zeros((t_horizon, n_loc, reps.max(1)));
    let wave = Array3::<f64>::zeros((t_horizon, n_loc, reps.max(1)));
    let initial_cover = Array2::<f64>::zeros((domain::N_SPECIES_BINS, n_loc));
    let integrator = crate::scenario::growth::FixedStepRk4Integrator::default();
    let config = crate::config::RunConfig::from_env().unwrap_or_default();

    let sink = crate::scenario::result::VecResultSink::new(params.len());
    crate::scenario::batch::run_batch(domain, params, &integrator, &dhw, &wave, &initial_cover, config.threshold, &sink);

    RunOutcome { domain, invoked_at, results: sink.into_results() }
}

/// One scenario's site-selection ranking at a single decision year: a
/// `(n_locations, 3)` table of `(site_id, seed_rank, shade_rank)`.
pub type RankTable = Vec<(usize, usize, usize)>;

/// Evaluates site selection for every row of `params` against the current
/// `cover` state, producing one rank table per scenario — the `(M,
/// n_locations, 3)` rank tensor §6 describes, returned as `Vec<RankTable>`
/// rather than a dense array since `site_id` is an integer label, not a
/// numeric quantity to average or normalize.
///
/// `depth_offset_override`, when set, replaces each row's own
/// `depth_offset` (the `area` argument §6 names is this crate's
/// depth/area eligibility knob, not a separate per-call area table — sites'
/// areas live on `Domain` and are read-only).
pub fn select(
    domain: &Domain,
    params: &[ScenarioParams],
    cover: &Array2<f64>,
    depth_offset_override: Option<f64>,
) -> Result<Vec<RankTable>, ReefMcError> {
    let n_loc = domain.n_locations();
    let dhw_t = vec![0.0; n_loc];
    let wave_t = vec![0.0; n_loc];

    params
        .iter()
        .map(|row| {
            let seed_weights = row.seed_criteria_weights();
            let shade_weights = row.shade_criteria_weights();
            let spread = SpreadConfig { enabled: row.spread_enabled, min_distance_fraction: row.spread_min_distance_fraction, top_n: row.spread_top_n };
            let input = SiteSelectionInput {
                domain,
                depth_min: row.depth_min,
                depth_offset: depth_offset_override.unwrap_or(row.depth_offset),
                dhw_t: &dhw_t,
                wave_t: &wave_t,
                cover,
                seed: IntentConfig { active: true, weights: &seed_weights, rules: &[], alg_ind: row.alg_ind, prev_pref_sites: &[] },
                shade: IntentConfig { active: true, weights: &shade_weights, rules: &[], alg_ind: row.alg_ind, prev_pref_sites: &[] },
                spread,
            };
            site_selector::select(input).map(|outcome: SelectionOutcome| {
                (1..=n_loc)
                    .map(|site_id| {
                        let idx = site_id - 1;
                        (site_id, outcome.seed_ranks.get(idx).copied().unwrap_or(0), outcome.shade_ranks.get(idx).copied().unwrap_or(0))
                    })
                    .collect()
            })
        })
        .collect::<Result<Vec<_>, SelectionError>>()
        .map_err(ReefMcError::from)
}
