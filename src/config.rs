//! # `config` – the two environment-driven knobs named in §6
//!
//! Exactly two recognized environment controls — `reps` and `threshold` —
//! so that is all this module reads; no general config-file format is
//! introduced. Read once, at batch-driver construction, into a plain
//! [`RunConfig`] rather than threaded through every call as loose
//! arguments.

use std::env;

use thiserror::Error;

use crate::scenario::runner::DEFAULT_EPSILON;

/// Process-environment variable names (§6 "Configuration").
pub const REPS_VAR: &str = "reps";
pub const THRESHOLD_VAR: &str = "threshold";

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidReps { var: &'static str, value: String },
    #[error("{var} must be a finite number, got {value:?}")]
    InvalidThreshold { var: &'static str, value: String },
}

/// Resolved run configuration: number of environmental replicates and the
/// quantization threshold below which output values are stored as 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunConfig {
    pub reps: usize,
    pub threshold: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { reps: 1, threshold: DEFAULT_EPSILON }
    }
}

impl RunConfig {
    /// Reads `reps` and `threshold` from the process environment, falling
    /// back to [`RunConfig::default`] for each variable that is unset.
    /// Malformed values (non-numeric, non-positive `reps`, non-finite
    /// `threshold`) are reported as [`ConfigError`] rather than silently
    /// defaulted, since a bad environment variable is an operator mistake
    /// the caller should see.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var(REPS_VAR) {
            let parsed: usize = raw
                .parse()
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| ConfigError::InvalidReps { var: REPS_VAR, value: raw.clone() })?;
            config.reps = parsed;
        }

        if let Ok(raw) = env::var(THRESHOLD_VAR) {
            let parsed: f64 = raw
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| ConfigError::InvalidThreshold { var: THRESHOLD_VAR, value: raw.clone() })?;
            config.threshold = parsed;
        }

        Ok(config)
    }
}
