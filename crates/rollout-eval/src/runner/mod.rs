//! Evaluation runner components
//!
//! Sample expansion, bounded-concurrency execution and the evaluator that ties
//! them to the checkpoint store.

mod config;
mod controller;
mod executor;
mod expander;

pub use config::EvalConfig;
pub use controller::{ConcurrencyController, SampleExecution};
pub use executor::{EvalProgress, EvalRun, Evaluator, ProgressCallback, RunStats};
pub use expander::{default_problem_id, expand_samples};
