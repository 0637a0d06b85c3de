//! Component F step 8: the growth ODE integrator.
//!
//! The coral growth kernel is treated as a black box with a fixed
//! state-derivative contract. [`GrowthIntegrator`] is that contract;
//! [`FixedStepRk4Integrator`] is a minimal logistic-relaxation stand-in so
//! the crate is runnable end-to-end without a real coral-growth model
//! plugged in, the same way a caller can supply any fitness closure to an
//! evaluator without the crate shipping domain-specific objectives itself.

use ndarray::{Array1, Array2};

/// Advances a cover state forward by `span` years given per-location
/// carrying capacities `k`. Implementations own whatever growth-rate
/// parameters they need; the stepper only supplies state, capacity, and
/// elapsed time.
pub trait GrowthIntegrator: Send + Sync {
    fn integrate(&self, initial: &Array2<f64>, k: &Array1<f64>, span: f64) -> Array2<f64>;
}

/// Fourth-order Runge-Kutta over a fixed step count, with a logistic
/// per-bin relaxation toward the location's carrying capacity as the
/// derivative: `dY/dt = r * Y * (1 - Y/k)`.
pub struct FixedStepRk4Integrator {
    pub growth_rate: f64,
    pub n_steps: usize,
}

impl Default for FixedStepRk4Integrator {
    fn default() -> Self {
        Self { growth_rate: 0.3, n_steps: 4 }
    }
}

impl FixedStepRk4Integrator {
    fn derivative(&self, y: &Array2<f64>, k: &Array1<f64>) -> Array2<f64> {
        let mut dy = Array2::<f64>::zeros(y.raw_dim());
        for l in 0..y.ncols() {
            let kl = k[l];
            if kl <= 0.0 {
                continue;
            }
            for s in 0..y.nrows() {
                let v = y[[s, l]];
                dy[[s, l]] = self.growth_rate * v * (1.0 - v / kl);
            }
        }
        dy
    }
}

impl GrowthIntegrator for FixedStepRk4Integrator {
    fn integrate(&self, initial: &Array2<f64>, k: &Array1<f64>, span: f64) -> Array2<f64> {
        let n_steps = self.n_steps.max(1);
        let h = span / n_steps as f64;
        let mut y = initial.clone();
        for _ in 0..n_steps {
            let k1 = self.derivative(&y, k);
            let y2 = &y + &(&k1 * (h / 2.0));
            let k2 = self.derivative(&y2, k);
            let y3 = &y + &(&k2 * (h / 2.0));
            let k3 = self.derivative(&y3, k);
            let y4 = &y + &(&k3 * h);
            let k4 = self.derivative(&y4, k);
            y = &y + &((&k1 + &(&k2 * 2.0) + &(&k3 * 2.0) + &k4) * (h / 6.0));
            y.mapv_inplace(|v| v.max(0.0));
        }
        y
    }
}
