//! Component F: the ecosystem stepper (§4.F) — the largest single piece of
//! the core. Advances `Y[t-1, :, :]` to `Y[t, :, :]` through larval
//! production, recruitment, DHW/SRM/fogging adjustment, bleaching
//! mortality, combined proportional loss, intervention application, growth
//! integration, and the proportional-cover adjustment, in that fixed order.

use ndarray::{Array1, Array2, Axis};

use crate::domain::Domain;
use crate::mcda::site_selector::{self, IntentConfig, SelectionError, SelectionOutcome, SiteSelectionInput, SpreadConfig};
use crate::random::RandomGenerator;
use crate::scenario::cache::Cache;
use crate::scenario::cover;
use crate::scenario::growth::GrowthIntegrator;
use crate::scenario::params::{ScenarioParams, ALG_IND_COUNTERFACTUAL, ALG_IND_UNGUIDED};

fn gompertz(x: f64, shape_a: f64, shape_b: f64) -> f64 {
    (-shape_a * (shape_b * x).exp()).exp()
}

/// Per-step deployment logs (§3 "Ranking log", §6 "seed log ... fog log
/// ... shade log").
#[derive(Debug, Clone)]
pub struct StepLogs {
    /// Cover fraction added per enhanced taxon (row) per location (col).
    pub seed_added: Array2<f64>,
    /// DHW multiplier applied at fogged locations (0 where not fogged).
    pub fog_applied: Array1<f64>,
    /// DHW reduction applied uniformly by SRM this step (0 if inactive).
    pub shade_reduction: f64,
}

/// Full output of one `step` call.
pub struct StepOutput {
    pub y_t: Array2<f64>,
    pub selection: SelectionOutcome,
    pub logs: StepLogs,
}

/// Runs one decision on where to intervene this year, dispatching on
/// `alg_ind` (§3): -1 skips selection (counterfactual scenario, no
/// intervention ever applied), 0 falls back to an unguided random pick,
/// 1..=3 invokes the full dMCDA pipeline (§4.A–§4.D).
#[allow(clippy::too_many_arguments)]
fn select_sites<R: RandomGenerator>(
    domain: &Domain,
    params: &ScenarioParams,
    rng: &mut R,
    dhw_t: &Array1<f64>,
    wave_t: &Array1<f64>,
    cover_prev: &Array2<f64>,
    prev_seed: &[usize],
    prev_shade: &[usize],
    seed_active: bool,
    shade_active: bool,
) -> Result<SelectionOutcome, SelectionError> {
    let n_int = domain.constants.n_int;
    let n_loc = domain.n_locations();

    if params.alg_ind == ALG_IND_COUNTERFACTUAL {
        return Ok(SelectionOutcome {
            pref_seed_sites: vec![0; n_int],
            pref_shade_sites: vec![0; n_int],
            seed_ranks: vec![0; n_loc],
            shade_ranks: vec![0; n_loc],
        });
    }

    if params.alg_ind == ALG_IND_UNGUIDED {
        let excluded: std::collections::HashSet<usize> =
            prev_seed.iter().chain(prev_shade.iter()).filter(|&&id| id != 0).copied().collect();
        let mut pool: Vec<usize> = (1..=n_loc).filter(|id| !excluded.contains(id)).collect();
        rng.shuffle_vec_usize(&mut pool);

        let pick = |active: bool, pool: &[usize]| -> Vec<usize> {
            if !active {
                return vec![];
            }
            let mut sites: Vec<usize> = pool.iter().take(n_int).copied().collect();
            sites.resize(n_int, 0);
            sites
        };
        let pref_seed_sites = if seed_active { pick(true, &pool) } else { prev_seed.to_vec() };
        let pref_shade_sites = if shade_active { pick(true, &pool) } else { prev_shade.to_vec() };
        return Ok(SelectionOutcome {
            pref_seed_sites,
            pref_shade_sites,
            seed_ranks: vec![0; n_loc],
            shade_ranks: vec![0; n_loc],
        });
    }

    let seed_weights = params.seed_criteria_weights();
    let shade_weights = params.shade_criteria_weights();
    let spread = SpreadConfig {
        enabled: params.spread_enabled,
        min_distance_fraction: params.spread_min_distance_fraction,
        top_n: params.spread_top_n,
    };
    let input = SiteSelectionInput {
        domain,
        depth_min: params.depth_min,
        depth_offset: params.depth_offset,
        dhw_t: dhw_t.as_slice().unwrap(),
        wave_t: wave_t.as_slice().unwrap(),
        cover: cover_prev,
        seed: IntentConfig { active: seed_active, weights: &seed_weights, rules: &[], alg_ind: params.alg_ind, prev_pref_sites: prev_seed },
        shade: IntentConfig { active: shade_active, weights: &shade_weights, rules: &[], alg_ind: params.alg_ind, prev_pref_sites: prev_shade },
        spread,
    };
    site_selector::select(input)
}

/// Runs §4.F steps 1-9 for one year.
#[allow(clippy::too_many_arguments)]
pub fn step<R: RandomGenerator>(
    domain: &Domain,
    params: &ScenarioParams,
    integrator: &dyn GrowthIntegrator,
    cache: &mut Cache,
    rng: &mut R,
    y_prev: &Array2<f64>,
    dhw_prev: &Array1<f64>,
    dhw_current: &Array1<f64>,
    wave_current: &Array1<f64>,
    prev_pref_seed_sites: &[usize],
    prev_pref_shade_sites: &[usize],
    is_seed_year: bool,
    is_shade_year: bool,
) -> Result<StepOutput, SelectionError> {
    let n_loc = domain.n_locations();
    let n_groups = domain.species.len();
    let bin_ranges = domain.species_bin_ranges();
    let k: Array1<f64> = Array1::from_vec(domain.locations.iter().map(|l| l.k).collect());
    let areas: Vec<f64> = domain.locations.iter().map(|l| l.area_m2).collect();

    // Step 1: larval production (Gompertz response to DHW at t-1).
    for g in 0..n_groups {
        let sp = &domain.species[g];
        let adaptation = sp.natural_adaptation + sp.assisted_adaptation;
        for l in 0..n_loc {
            let effective_dhw = (dhw_prev[l] - adaptation).max(0.0).min(domain.constants.dhw_max_tot);
            cache.lps[[g, l]] = gompertz(
                domain.constants.dhw_max_tot - effective_dhw,
                domain.constants.lp_dhw_coeff,
                domain.constants.lpd_prm2,
            );
        }
    }

    // Step 2: fecundity scope per group.
    cache.fec_scope.fill(0.0);
    for (g, &(start, end)) in bin_ranges.iter().enumerate() {
        let sp = &domain.species[g];
        for (local, bin) in (start..end).enumerate() {
            let fec = sp.fecundity_per_m2.get(local).copied().unwrap_or(0.0);
            for l in 0..n_loc {
                cache.fec_scope[[g, l]] += fec * y_prev[[bin, l]] * areas[l];
            }
        }
    }

    // Step 3: recruitment via the connectivity transition matrix.
    let fs = &cache.fec_scope * &cache.lps;
    let recruits = fs.dot(&domain.connectivity);

    // Seed recruits into each group's smallest size-class bin.
    let mut cov_tmp = y_prev.clone();
    for (g, &(start, _end)) in bin_ranges.iter().enumerate() {
        for l in 0..n_loc {
            if areas[l] > 0.0 {
                let added = domain.constants.potential_settler_cover * recruits[[g, l]] / areas[l];
                cov_tmp[[start, l]] = (cov_tmp[[start, l]] + added).max(0.0);
            }
        }
    }

    // Site selection happens before the DHW adjustment so step 4's fogging
    // target and step 7's intervention sites use this year's freshly
    // computed prefs rather than last decision-year's (§2: the stepper
    // "optionally invokes" the site selector ahead of applying anything).
    let selection = select_sites(
        domain,
        params,
        rng,
        dhw_current,
        wave_current,
        y_prev,
        prev_pref_seed_sites,
        prev_pref_shade_sites,
        is_seed_year && params.alg_ind != ALG_IND_COUNTERFACTUAL,
        is_shade_year && params.alg_ind != ALG_IND_COUNTERFACTUAL,
    )?;

    // Step 4: DHW adjustment from shading (SRM) and fogging.
    let mut dhw_step = dhw_current.clone();
    let mut shade_reduction = 0.0;
    if is_shade_year && params.srm > 0.0 {
        shade_reduction = params.srm;
        dhw_step.mapv_inplace(|v| (v - params.srm).max(0.0));
    }
    let mut fog_applied = Array1::<f64>::zeros(n_loc);
    let fog_targets: &[usize] = if selection.pref_seed_sites.iter().any(|&s| s != 0) {
        &selection.pref_seed_sites
    } else {
        &selection.pref_shade_sites
    };
    if is_shade_year && params.fogging > 0.0 && fog_targets.iter().any(|&s| s != 0) {
        for &site in fog_targets {
            if site != 0 {
                let idx = site - 1;
                dhw_step[idx] *= 1.0 - params.fogging;
                fog_applied[idx] = params.fogging;
            }
        }
    }
    cache.dhw_step.assign(&dhw_step);

    // Step 5: bleaching mortality.
    for (g, &(start, end)) in bin_ranges.iter().enumerate() {
        let sp = &domain.species[g];
        let adaptation = sp.natural_adaptation + sp.assisted_adaptation;
        for bin in start..end {
            for l in 0..n_loc {
                let adjusted = (dhw_step[l] * (1.0 - sp.bleach_resistance) - adaptation).max(0.0);
                cache.bleach_surv[[bin, l]] =
                    gompertz(adjusted, -domain.constants.gompertz_p1, -domain.constants.gompertz_p2);
            }
        }
    }

    // Step 6: combined proportional loss (bleach x wave survival).
    let n_bins = y_prev.nrows();
    for bin in 0..n_bins {
        let (g, _) = domain.group_for_bin(bin).unwrap_or((0, 0));
        let wave90 = domain.species.get(g).map(|s| s.wave_mortality_90).unwrap_or(0.0);
        for l in 0..n_loc {
            let wave_surv = 1.0 - (wave90 * wave_current[l]).clamp(0.0, 1.0);
            cache.prop_loss[[bin, l]] = cov_tmp[[bin, l]] * cache.bleach_surv[[bin, l]] * wave_surv;
        }
    }
    cov_tmp.assign(&cache.prop_loss);

    // Step 7: intervention application (two enhanced taxa, size-class 2).
    let n_int = domain.constants.n_int as f64;
    let mut seed_added = Array2::<f64>::zeros((2, n_loc));
    if is_seed_year && selection.pref_seed_sites.iter().any(|&s| s != 0) {
        let volumes = [params.seed_volume_tabular, params.seed_volume_corymbose];
        for (taxon_idx, &bin) in domain.constants.enhanced_taxon_bins.iter().enumerate() {
            let colony_area = domain.colony_area_for_bin(bin);
            for &site in &selection.pref_seed_sites {
                if site == 0 {
                    continue;
                }
                let l = site - 1;
                let kl = k[l];
                if areas[l] <= 0.0 || kl <= 0.0 {
                    continue;
                }
                let added = (volumes[taxon_idx] / n_int) * colony_area / (areas[l] * kl);
                cov_tmp[[bin, l]] += added;
                seed_added[[taxon_idx, l]] += added;
            }
        }
    }

    // Step 8: growth ODE integration.
    let mut y_t = integrator.integrate(&cov_tmp, &k, 1.0);

    // Step 9: proportional-cover adjustment.
    cover::adjust(&mut y_t, &k);
    cache.y_cover.assign(&y_t.sum_axis(Axis(0)));

    Ok(StepOutput {
        y_t,
        selection,
        logs: StepLogs { seed_added, fog_applied, shade_reduction },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, SimConstants, SpeciesParams};
    use crate::random::NoopRandomGenerator;
    use crate::scenario::growth::FixedStepRk4Integrator;
    use crate::scenario::params::ScenarioParamsBuilder;
    use ndarray::array;

    fn toy_domain() -> Domain {
        let locations = vec![
            Location { site_id: "a".into(), unique_id: "a".into(), area_m2: 100.0, depth_med: 5.0, k: 0.5, centroid: (0.0, 0.0) },
            Location { site_id: "b".into(), unique_id: "b".into(), area_m2: 100.0, depth_med: 5.0, k: 0.5, centroid: (1.0, 0.0) },
        ];
        let connectivity = array![[0.1, 0.05], [0.05, 0.1]];
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
            horizon_years: 10,
            n_int: 1,
            default_seed_start_year: 2,
            default_shade_start_year: 2,
            lp_dhw_coeff: 0.4,
            dhw_max_tot: 8.0,
            lpd_prm2: 0.3,
            gompertz_p1: 3.0,
            gompertz_p2: 0.3,
            potential_settler_cover: 0.001,
            enhanced_taxon_bins: [1, 1],
        };
        Domain::new(locations, connectivity, species, constants).unwrap()
    }

    fn toy_params() -> ScenarioParams {
        ScenarioParamsBuilder::default()
            .rcp("4.5")
            .alg_ind(crate::scenario::params::ALG_IND_COUNTERFACTUAL)
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
    fn test_capacity_invariant_holds_after_step() {
        let domain = toy_domain();
        let params = toy_params();
        let integrator = FixedStepRk4Integrator::default();
        let mut cache = Cache::new(2, 1, 2);
        let mut rng = NoopRandomGenerator::new();
        let y_prev = array![[0.2, 0.2], [0.2, 0.2]];
        let dhw_prev = Array1::zeros(2);
        let dhw_t = Array1::zeros(2);
        let wave_t = Array1::zeros(2);

        let out = step(&domain, &params, &integrator, &mut cache, &mut rng, &y_prev, &dhw_prev, &dhw_t, &wave_t, &[], &[], false, false).unwrap();
        let sums = out.y_t.sum_axis(Axis(0));
        for l in 0..2 {
            assert!(sums[l] <= domain.locations[l].k + 1e-9);
        }
    }

    #[test]
    fn test_counterfactual_never_selects_sites() {
        let domain = toy_domain();
        let params = toy_params();
        let integrator = FixedStepRk4Integrator::default();
        let mut cache = Cache::new(2, 1, 2);
        let mut rng = NoopRandomGenerator::new();
        let y_prev = array![[0.1, 0.1], [0.1, 0.1]];
        let dhw_prev = Array1::zeros(2);
        let dhw_t = Array1::zeros(2);
        let wave_t = Array1::zeros(2);

        let out = step(&domain, &params, &integrator, &mut cache, &mut rng, &y_prev, &dhw_prev, &dhw_t, &wave_t, &[], &[], true, true).unwrap();
        assert!(out.selection.pref_seed_sites.iter().all(|&s| s == 0));
        assert!(out.selection.pref_shade_sites.iter().all(|&s| s == 0));
    }

    #[test]
    fn test_non_negative_output() {
        let domain = toy_domain();
        let params = toy_params();
        let integrator = FixedStepRk4Integrator::default();
        let mut cache = Cache::new(2, 1, 2);
        let mut rng = NoopRandomGenerator::new();
        let y_prev = array![[0.0, 0.0], [0.0, 0.0]];
        let dhw_prev = array![5.0, 5.0];
        let dhw_t = array![5.0, 5.0];
        let wave_t = array![0.3, 0.3];

        let out = step(&domain, &params, &integrator, &mut cache, &mut rng, &y_prev, &dhw_prev, &dhw_t, &wave_t, &[], &[], false, false).unwrap();
        assert!(out.y_t.iter().all(|&v| v >= 0.0));
    }
}
