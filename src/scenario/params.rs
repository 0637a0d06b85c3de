//! One row of the scenario parameter table (§3 "Scenario parameters").
//!
//! Built with `derive_builder` — named setters, a `build()` that validates
//! nothing beyond "every required field was supplied" (deeper validation,
//! e.g. the `alg_ind` taxonomy, happens where it is actually acted on).

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::mcda::decision_matrix::CriteriaWeights;

/// `alg_ind` values with a reserved, non-dMCDA meaning (§3).
pub const ALG_IND_COUNTERFACTUAL: i32 = -1;
pub const ALG_IND_UNGUIDED: i32 = 0;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ScenarioParams {
    pub rcp: String,
    /// -1 = counterfactual (no intervention), 0 = unguided (random site
    /// selection), 1..=3 = OrderSum/TOPSIS/VIKOR.
    pub alg_ind: i32,

    pub seed_volume_tabular: f64,
    pub seed_volume_corymbose: f64,
    pub fogging: f64,
    pub srm: f64,

    pub seed_start_year: usize,
    pub seed_years: usize,
    pub seed_freq: usize,
    pub shade_start_year: usize,
    pub shade_years: usize,
    pub shade_freq: usize,

    pub weight_wave: f64,
    pub weight_heat: f64,
    pub weight_in_connectivity: f64,
    pub weight_out_connectivity: f64,
    pub weight_high_cover: f64,
    pub weight_low_cover: f64,
    pub weight_seed_priority: f64,
    pub weight_shade_priority: f64,

    pub deployed_coral_risk_tolerance: f64,
    pub depth_min: f64,
    pub depth_offset: f64,

    pub spread_enabled: bool,
    pub spread_min_distance_fraction: f64,
    pub spread_top_n: usize,
}

impl ScenarioParams {
    /// The shared criteria weights common to both intents: everything
    /// except the two priority columns, which each intent selects only its
    /// own subset of (§4.D projects onto "the current intent's non-zero
    /// weights"); `available_space` carries no scenario-level weight and is
    /// left at 0.
    fn shared_criteria_weights(&self) -> CriteriaWeights {
        let mut w = CriteriaWeights::zero();
        w.set("wave_damage", self.weight_wave);
        w.set("heat_stress", self.weight_heat);
        w.set("in_connectivity", self.weight_in_connectivity);
        w.set("out_connectivity", self.weight_out_connectivity);
        w.set("high_cover", self.weight_high_cover);
        w.set("low_cover", self.weight_low_cover);
        w
    }

    /// Criteria weights for the seed intent: the shared subset plus
    /// `seed_priority`, with `shade_priority` forced to 0 so the shade-only
    /// criterion never influences seed ranking.
    pub fn seed_criteria_weights(&self) -> CriteriaWeights {
        let mut w = self.shared_criteria_weights();
        w.set("seed_priority", self.weight_seed_priority);
        w
    }

    /// Criteria weights for the shade intent: the shared subset plus
    /// `shade_priority`, with `seed_priority` forced to 0 so the seed-only
    /// criterion never influences shade ranking.
    pub fn shade_criteria_weights(&self) -> CriteriaWeights {
        let mut w = self.shared_criteria_weights();
        w.set("shade_priority", self.weight_shade_priority);
        w
    }

    /// The first [`crate::random::SEED_FIELD_COUNT`] numeric fields, in a
    /// fixed order, for deterministic unguided-selection seeding (§5).
    pub fn seed_fields(&self) -> Vec<f64> {
        vec![
            self.alg_ind as f64,
            self.seed_volume_tabular,
            self.seed_volume_corymbose,
            self.fogging,
            self.srm,
            self.seed_start_year as f64,
            self.seed_years as f64,
            self.seed_freq as f64,
            self.shade_start_year as f64,
            self.shade_years as f64,
            self.shade_freq as f64,
            self.weight_wave,
            self.weight_heat,
            self.weight_in_connectivity,
            self.weight_out_connectivity,
            self.weight_high_cover,
            self.weight_low_cover,
            self.weight_seed_priority,
            self.weight_shade_priority,
            self.deployed_coral_risk_tolerance,
            self.depth_min,
            self.depth_offset,
            self.spread_enabled as u8 as f64,
            self.spread_min_distance_fraction,
        ]
    }
}
