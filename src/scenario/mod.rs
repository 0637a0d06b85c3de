//! # `scenario` – the per-scenario time-stepped simulation
//!
//! Ties the intervention scheduler ([`scheduler`]), ecosystem stepper
//! ([`stepper`], which in turn calls into [`crate::mcda`]), growth
//! integrator contract ([`growth`]), proportional-cover adjuster
//! ([`cover`]), per-worker scratch buffers ([`cache`]), output shapes
//! ([`result`]), the per-scenario loop ([`runner`]), and the parallel
//! batch fan-out ([`batch`]) into one simulation pipeline.

pub mod batch;
pub mod cache;
pub mod cover;
pub mod growth;
pub mod params;
pub mod result;
pub mod runner;
pub mod scheduler;
pub mod stepper;

pub use batch::{run_batch, run_batch_default_threshold, PARALLEL_THRESHOLD};
pub use cache::Cache;
pub use growth::{FixedStepRk4Integrator, GrowthIntegrator};
pub use params::{ScenarioParams, ScenarioParamsBuilder};
pub use result::{ResultSink, ScenarioResult, VecResultSink};
pub use runner::{rng_for_scenario, run_scenario, DEFAULT_EPSILON};
