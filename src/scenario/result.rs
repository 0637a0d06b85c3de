//! Per-scenario output shapes and the result-store callback contract (§6).
//!
//! The runner is agnostic to how results are actually stored — it only
//! needs a slot to write into at a pre-assigned index (§4.H "each scenario
//! produces an independent result tuple written to the result store at its
//! pre-assigned index"). [`ResultSink`] is that slot; [`VecResultSink`] is
//! the in-memory implementation this crate ships (file/database-backed
//! sinks are an external collaborator per §1).

use ndarray::{Array3, Array4};

/// Everything one scenario produces, indexed `[t, ..., l, r]` as named in
/// §6 (`T` years, `36` species bins, `N_loc` locations, `R` environmental
/// replicates).
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub raw_cover: Array4<f64>,
    pub seed_log: Array4<f64>,
    pub fog_log: Array3<f64>,
    pub shade_log: Array3<f64>,
    /// Mean over replicates, shape (T, n_locations, 2) — columns are
    /// (seed_rank, shade_rank).
    pub site_ranks: Array3<f64>,
    /// Set when the scenario could not complete normally; the result above
    /// is still partially populated (§7 "scenario-local errors are logged
    /// and the scenario yields a partially populated result with a failure
    /// flag").
    pub failure: Option<String>,
}

/// Quantizes every value with `|v| < threshold` to exactly 0 (§6 "values
/// below epsilon are quantized to 0"), to keep the mostly-sparse logs cheap
/// to store.
pub fn quantize(value: f64, threshold: f64) -> f64 {
    if value.abs() < threshold {
        0.0
    } else {
        value
    }
}

/// Where the batch driver (§4.H) writes each scenario's result, keyed by
/// its pre-assigned index. Implementations must tolerate out-of-order,
/// concurrent writes to disjoint indices (§5 "writers never overlap").
pub trait ResultSink: Send + Sync {
    fn write(&self, index: usize, result: ScenarioResult);
}

/// In-memory `ResultSink` backed by a fixed-size, index-addressed vector of
/// slots. Construct with the scenario count known up front so every worker
/// writes to a pre-existing `Mutex<Option<..>>` slot without contending on a
/// shared growth operation.
pub struct VecResultSink {
    slots: Vec<std::sync::Mutex<Option<ScenarioResult>>>,
}

impl VecResultSink {
    pub fn new(n_scenarios: usize) -> Self {
        Self { slots: (0..n_scenarios).map(|_| std::sync::Mutex::new(None)).collect() }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Takes ownership of every result, consuming the sink. Panics if any
    /// slot was never written — callers should only do this after the
    /// batch driver confirms every scenario ran.
    pub fn into_results(self) -> Vec<ScenarioResult> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.into_inner().unwrap().unwrap_or_else(|| panic!("scenario {i} never wrote a result")))
            .collect()
    }
}

impl ResultSink for VecResultSink {
    fn write(&self, index: usize, result: ScenarioResult) {
        *self.slots[index].lock().unwrap() = Some(result);
    }
}
