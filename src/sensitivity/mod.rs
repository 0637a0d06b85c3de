//! # `sensitivity` – Global sensitivity analysis over Monte Carlo batches
//!
//! Three moment-/density-based methods share a common quantile-slicing step
//! (§4.I): [`pawn`] (moment-independent index via Kolmogorov–Smirnov),
//! [`rsa`] (Regional Sensitivity Analysis via k-sample Anderson–Darling),
//! and [`outcome_map`] (bootstrap confidence intervals on a behavioral
//! outcome rule). The slicing itself, and the two statistical distance
//! measures, are implemented locally — no crate in this stack provides them.

mod anderson_darling;
mod ks;
mod slicing;

pub mod outcome_map;
pub mod pawn;
pub mod rsa;

pub use outcome_map::{outcome_map as run_outcome_map, OutcomeCell, DEFAULT_CI, DEFAULT_RESAMPLES};
pub use pawn::{pawn_index, pawn_index_matrix, temporal_pawn, PawnSummary, DEFAULT_SLICES};
pub use rsa::{coverage, rsa, rsa_matrix, RsaCell};
