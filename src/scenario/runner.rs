//! Component G: the scenario runner (§4.G). Allocates the scratch [`Cache`]
//! once, loops over environmental replicates and years, and assembles one
//! [`ScenarioResult`]. Mean-over-replicates is taken only for `site_ranks`,
//! per §4.G's "bound stored volume" note — everything else keeps its full
//! `R` dimension.

use log::error;
use ndarray::{Array2, Array3, Array4, Axis};

use crate::domain::Domain;
use crate::mcda::site_selector::SelectionError;
use crate::random::{MOORandomGenerator, RandomGenerator};
use crate::scenario::cache::Cache;
use crate::scenario::growth::GrowthIntegrator;
use crate::scenario::params::ScenarioParams;
use crate::scenario::result::{quantize, ScenarioResult};
use crate::scenario::scheduler;
use crate::scenario::stepper;

/// Default epsilon below which stored values are quantized to 0 (§4.G
/// "a configurable epsilon (default 1e-6 class)").
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Runs one scenario end to end over every environmental replicate.
///
/// `dhw` and `wave` are shaped `(T, n_locations, R)`; `initial_cover` is
/// `(n_bins, n_locations)` and shared as the year-1 state across every
/// replicate (§6).
pub fn run_scenario<R: RandomGenerator>(
    domain: &Domain,
    params: &ScenarioParams,
    integrator: &dyn GrowthIntegrator,
    rng: &mut R,
    dhw: &Array3<f64>,
    wave: &Array3<f64>,
    initial_cover: &Array2<f64>,
    epsilon: f64,
) -> ScenarioResult {
    let t_horizon = domain.constants.horizon_years;
    let n_loc = domain.n_locations();
    let n_bins = initial_cover.nrows();
    let n_reps = dhw.shape()[2];
    let n_int = domain.constants.n_int;

    let seed_years = scheduler::decision_years(params.seed_start_year, params.seed_years, params.seed_freq, t_horizon);
    let shade_years = scheduler::decision_years(params.shade_start_year, params.shade_years, params.shade_freq, t_horizon);

    let mut raw_cover = Array4::<f64>::zeros((t_horizon, n_bins, n_loc, n_reps));
    let mut seed_log = Array4::<f64>::zeros((t_horizon, 2, n_loc, n_reps));
    let mut fog_log = Array3::<f64>::zeros((t_horizon, n_loc, n_reps));
    let mut shade_log = Array3::<f64>::zeros((t_horizon, n_loc, n_reps));
    let mut seed_rank_sum = Array2::<f64>::zeros((t_horizon, n_loc));
    let mut shade_rank_sum = Array2::<f64>::zeros((t_horizon, n_loc));

    let mut cache = Cache::new(n_loc, domain.species.len(), n_bins);
    let mut failure: Option<String> = None;

    'replicates: for r in 0..n_reps {
        let mut y = initial_cover.clone();
        raw_cover.slice_mut(ndarray::s![0, .., .., r]).assign(&y);

        let mut pref_seed_sites = vec![0usize; n_int];
        let mut pref_shade_sites = vec![0usize; n_int];

        for t in 2..=t_horizon {
            let dhw_prev = dhw.slice(ndarray::s![t - 2, .., r]).to_owned();
            let dhw_current = dhw.slice(ndarray::s![t - 1, .., r]).to_owned();
            let wave_current = wave.slice(ndarray::s![t - 1, .., r]).to_owned();

            let out = match stepper::step(
                domain,
                params,
                integrator,
                &mut cache,
                rng,
                &y,
                &dhw_prev,
                &dhw_current,
                &wave_current,
                &pref_seed_sites,
                &pref_shade_sites,
                seed_years[t],
                shade_years[t],
            ) {
                Ok(out) => out,
                Err(SelectionError::Seed(e)) | Err(SelectionError::Shade(e)) => {
                    error!("scenario failed at year {t}, replicate {r}: {e}");
                    failure = Some(e.to_string());
                    break 'replicates;
                }
            };

            y = out.y_t;
            raw_cover.slice_mut(ndarray::s![t - 1, .., .., r]).assign(&y);
            seed_log.slice_mut(ndarray::s![t - 1, .., .., r]).assign(&out.logs.seed_added);
            fog_log.slice_mut(ndarray::s![t - 1, .., r]).assign(&out.logs.fog_applied);
            shade_log.slice_mut(ndarray::s![t - 1, .., r]).fill(out.logs.shade_reduction);

            for l in 0..n_loc {
                seed_rank_sum[[t - 1, l]] += out.selection.seed_ranks[l] as f64;
                shade_rank_sum[[t - 1, l]] += out.selection.shade_ranks[l] as f64;
            }

            pref_seed_sites = out.selection.pref_seed_sites;
            pref_shade_sites = out.selection.pref_shade_sites;
        }
    }

    raw_cover.mapv_inplace(|v| quantize(v, epsilon));
    seed_log.mapv_inplace(|v| quantize(v, epsilon));
    fog_log.mapv_inplace(|v| quantize(v, epsilon));
    shade_log.mapv_inplace(|v| quantize(v, epsilon));

    let mut site_ranks = Array3::<f64>::zeros((t_horizon, n_loc, 2));
    if n_reps > 0 {
        site_ranks.index_axis_mut(Axis(2), 0).assign(&(&seed_rank_sum / n_reps as f64));
        site_ranks.index_axis_mut(Axis(2), 1).assign(&(&shade_rank_sum / n_reps as f64));
    }

    ScenarioResult { raw_cover, seed_log, fog_log, shade_log, site_ranks, failure }
}

/// Builds the scenario's own deterministic RNG from its parameter row (§5).
pub fn rng_for_scenario(params: &ScenarioParams) -> MOORandomGenerator {
    MOORandomGenerator::new_for_scenario(&params.seed_fields())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, SimConstants, SpeciesParams};
    use crate::scenario::growth::FixedStepRk4Integrator;
    use crate::scenario::params::{ScenarioParamsBuilder, ALG_IND_COUNTERFACTUAL};
    use ndarray::Array2;

    fn toy_domain(n: usize, horizon: usize) -> Domain {
        let locations: Vec<Location> = (0..n)
            .map(|i| Location { site_id: format!("s{i}"), unique_id: format!("s{i}"), area_m2: 100.0, depth_med: 5.0, k: 0.5, centroid: (i as f64, 0.0) })
            .collect();
        let connectivity = Array2::<f64>::zeros((n, n));
        let species = vec![SpeciesParams {
            name: "acropora".into(),
            fecundity_per_m2: vec![0.0, 1.0],
            colony_area_m2: vec![0.01, 0.05],
            bleach_resistance: 0.2,
            natural_adaptation: 0.0,
            assisted_adaptation: 0.0,
            wave_mortality_90: 0.1,
        }];
        let constants = SimConstants {
            horizon_years: horizon,
            n_int: 2,
            default_seed_start_year: 2,
            default_shade_start_year: 2,
            lp_dhw_coeff: 0.4,
            dhw_max_tot: 8.0,
            lpd_prm2: 0.3,
            gompertz_p1: 3.0,
            gompertz_p2: 0.3,
            potential_settler_cover: 0.0,
            enhanced_taxon_bins: [1, 1],
        };
        Domain::new(locations, connectivity, species, constants).unwrap()
    }

    fn toy_params() -> ScenarioParams {
        ScenarioParamsBuilder::default()
            .rcp("4.5")
            .alg_ind(ALG_IND_COUNTERFACTUAL)
            .seed_volume_tabular(0.0)
            .seed_volume_corymbose(0.0)
            .fogging(0.0)
            .srm(0.0)
            .seed_start_year(2usize)
            .seed_years(0usize)
            .seed_freq(0usize)
            .shade_start_year(2usize)
            .shade_years(0usize)
            .shade_freq(0usize)
            .weight_wave(0.0)
            .weight_heat(0.0)
            .weight_in_connectivity(0.0)
            .weight_out_connectivity(0.0)
            .weight_high_cover(0.0)
            .weight_low_cover(0.0)
            .weight_seed_priority(0.0)
            .weight_shade_priority(0.0)
            .deployed_coral_risk_tolerance(0.0)
            .depth_min(0.0)
            .depth_offset(20.0)
            .spread_enabled(false)
            .spread_min_distance_fraction(0.5)
            .spread_top_n(2usize)
            .build()
            .unwrap()
    }

    #[test]
    fn test_scenario_capacity_invariant_over_horizon() {
        // §8 scenario 5: T=10, N_loc=5, k=0.5 everywhere, no interventions.
        let n_loc = 5;
        let horizon = 10;
        let domain = toy_domain(n_loc, horizon);
        let params = toy_params();
        let integrator = FixedStepRk4Integrator::default();
        let mut rng = rng_for_scenario(&params);
        let dhw = Array3::<f64>::zeros((horizon, n_loc, 2));
        let wave = Array3::<f64>::zeros((horizon, n_loc, 2));
        let mut initial_cover = Array2::<f64>::zeros((2, n_loc));
        initial_cover.fill(0.2); // sums to 0.4 per site across the 2 bins

        let result = run_scenario(&domain, &params, &integrator, &mut rng, &dhw, &wave, &initial_cover, DEFAULT_EPSILON);
        assert!(result.failure.is_none());
        for t in 0..horizon {
            for l in 0..n_loc {
                let sum: f64 = (0..2).map(|s| result.raw_cover[[t, s, l, 0]]).sum();
                assert!(sum <= 0.5 + 1e-9, "t={t} l={l} sum={sum}");
            }
        }
    }

    #[test]
    fn test_replicate_independence_with_disjoint_forcing() {
        let n_loc = 3;
        let horizon = 5;
        let domain = toy_domain(n_loc, horizon);
        let params = toy_params();
        let integrator = FixedStepRk4Integrator::default();

        let mut dhw = Array3::<f64>::zeros((horizon, n_loc, 2));
        dhw.index_axis_mut(Axis(2), 1).fill(3.0); // replicate 1 forced differently
        let wave = Array3::<f64>::zeros((horizon, n_loc, 2));
        let initial_cover = Array2::<f64>::from_elem((2, n_loc), 0.1);

        let mut rng1 = rng_for_scenario(&params);
        let result1 = run_scenario(&domain, &params, &integrator, &mut rng1, &dhw, &wave, &initial_cover, DEFAULT_EPSILON);
        let mut rng2 = rng_for_scenario(&params);
        let result2 = run_scenario(&domain, &params, &integrator, &mut rng2, &dhw, &wave, &initial_cover, DEFAULT_EPSILON);

        // Replicate 0's forcing and outputs are identical across both runs.
        for t in 0..horizon {
            for l in 0..n_loc {
                for s in 0..2 {
                    assert_eq!(result1.raw_cover[[t, s, l, 0]], result2.raw_cover[[t, s, l, 0]]);
                }
            }
        }
    }
}
