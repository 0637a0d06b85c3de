//! Per-worker scratch buffers (§9 "Scratch buffers"): allocated once by the
//! scenario runner and threaded into every call to the ecosystem stepper.
//! Never shared across threads (§5 "Caches ... must not be shared across
//! concurrent scenarios") — each rayon task owns its own [`Cache`].

use ndarray::{Array1, Array2};

/// Reusable working arrays for one scenario replicate's ecosystem stepper
/// (§4.F, §4.G).
pub struct Cache {
    /// Stress-attenuated fecundity multiplier, shape (n_groups, n_locations).
    pub lps: Array2<f64>,
    /// Per-bin fecundity potential before grouping, shape (n_bins, n_locations).
    pub fec_all: Array2<f64>,
    /// Grouped fecundity scope, shape (n_groups, n_locations).
    pub fec_scope: Array2<f64>,
    /// Combined bleach x wave survival-weighted cover, shape (n_bins, n_locations).
    pub prop_loss: Array2<f64>,
    /// Bleaching survival fraction, shape (n_bins, n_locations).
    pub bleach_surv: Array2<f64>,
    /// Working copy of this step's DHW vector after shading/fogging adjustment.
    pub dhw_step: Array1<f64>,
    /// Post-stressor, pre-growth cover, shape (n_bins, n_locations).
    pub cov_tmp: Array2<f64>,
    /// Per-location column sums, used by the proportional-cover adjuster.
    pub y_cover: Array1<f64>,
}

impl Cache {
    pub fn new(n_locations: usize, n_groups: usize, n_bins: usize) -> Self {
        Self {
            lps: Array2::zeros((n_groups, n_locations)),
            fec_all: Array2::zeros((n_bins, n_locations)),
            fec_scope: Array2::zeros((n_groups, n_locations)),
            prop_loss: Array2::zeros((n_bins, n_locations)),
            bleach_surv: Array2::zeros((n_bins, n_locations)),
            dhw_step: Array1::zeros(n_locations),
            cov_tmp: Array2::zeros((n_bins, n_locations)),
            y_cover: Array1::zeros(n_locations),
        }
    }
}
