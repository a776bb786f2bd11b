//! CLI commands

pub mod benchmarks;
pub mod metrics;
pub mod run;
