//! Component H: the scenario batch driver (§4.H).
//!
//! Fans a parameter table out across scenarios. Below
//! [`PARALLEL_THRESHOLD`] scenarios the batch runs sequentially (rayon's
//! own fan-out overhead is not worth paying for a handful of scenarios);
//! above it, every scenario runs on a `rayon` `par_iter` task. Each
//! scenario owns its own `Cache` and RNG (constructed inside
//! [`crate::scenario::runner::run_scenario`]) and writes to a disjoint,
//! pre-assigned [`ResultSink`] slot — no synchronization is needed between
//! workers (§5 "No cross-scenario shared mutable state").
//!
//! Scenarios evaluate independently, so `rayon` fans them out across
//! worker threads the same way a population's offspring would be
//! evaluated in parallel.

use ndarray::{Array2, Array3};
use rayon::prelude::*;

use crate::domain::Domain;
use crate::random::{MOORandomGenerator, RandomGenerator};
use crate::scenario::growth::GrowthIntegrator;
use crate::scenario::params::ScenarioParams;
use crate::scenario::result::ResultSink;
use crate::scenario::runner::{self, DEFAULT_EPSILON};

/// Scenario count above which the batch fans out across `rayon` workers
/// rather than running sequentially (§4.H "order of 64").
pub const PARALLEL_THRESHOLD: usize = 64;

/// Runs every row of `params` against the same [`Domain`] and climate
/// forcing, writing each scenario's result into `sink` at its row index.
///
/// `dhw` and `wave` are shared, read-only climate arrays (§5 "Shared
/// reads: Domain ... and climate arrays"); `initial_cover` is the
/// shared year-1 state every scenario starts from.
pub fn run_batch(
    domain: &Domain,
    params: &[ScenarioParams],
    integrator: &(dyn GrowthIntegrator + Sync),
    dhw: &Array3<f64>,
    wave: &Array3<f64>,
    initial_cover: &Array2<f64>,
    threshold: f64,
    sink: &(dyn ResultSink + Sync),
) {
    let run_one = |index: usize, row: &ScenarioParams| {
        let mut rng = MOORandomGenerator::new_for_scenario(&row.seed_fields());
        let result = runner::run_scenario(domain, row, integrator, &mut rng, dhw, wave, initial_cover, threshold);
        sink.write(index, result);
    };

    if params.len() > PARALLEL_THRESHOLD {
        params.par_iter().enumerate().for_each(|(index, row)| run_one(index, row));
    } else {
        for (index, row) in params.iter().enumerate() {
            run_one(index, row);
        }
    }
}

/// Convenience wrapper that also constructs the [`MOORandomGenerator`] for
/// the default epsilon (§4.G) when a caller has no [`crate::config::RunConfig`]
/// to hand.
pub fn run_batch_default_threshold(
    domain: &Domain,
    params: &[ScenarioParams],
    integrator: &(dyn GrowthIntegrator + Sync),
    dhw: &Array3<f64>,
    wave: &Array3<f64>,
    initial_cover: &Array2<f64>,
    sink: &(dyn ResultSink + Sync),
) {
    run_batch(domain, params, integrator, dhw, wave, initial_cover, DEFAULT_EPSILON, sink)
}
