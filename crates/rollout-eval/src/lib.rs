//! Resumable rollout evaluation engine
//!
//! Runs every task of a benchmark `n_rollouts` times against fresh
//! environments, at most `max_concurrency` at once, checkpointing each
//! completed sample to a JSONL log so an interrupted run picks up where it
//! left off. Completed samples are grouped by problem and scored with the
//! unbiased pass@k estimator.
//!
//! # Features
//!
//! - **Sample expansion**: stable, unique sample ids per (task, rollout)
//! - **Checkpointing**: append-only JSONL log with batched, synced flushes
//! - **Bounded concurrency**: semaphore admission, cleanup on every path
//! - **Metrics**: pass@k, summary statistics, pluggable metric functions
//! - **Benchmarks**: `aime`, `synthetic` and `jsonl` loaders behind a registry
//! - **Reports**: JSON, Markdown and terminal tables
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rollout_eval::{CommandConfig, CommandEnvironmentFactory, EvalConfig, Evaluator};
//!
//! let factory = Arc::new(CommandEnvironmentFactory::new(CommandConfig::new("./agent.sh")));
//! let evaluator = Evaluator::new(EvalConfig::new("results.jsonl").with_n_rollouts(8), factory)?;
//! let results = evaluator.run(tasks).await?;
//! let metrics = evaluator.compute_metrics(&results);
//! ```

pub mod benchmarks;
pub mod checkpoint;
pub mod environments;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod rewards;
pub mod runner;
pub mod sample;

// Re-exports for convenience
pub use benchmarks::{Benchmark, BenchmarkOptions};
pub use checkpoint::CheckpointStore;
pub use environments::{CommandConfig, CommandEnvironment, CommandEnvironmentFactory};
pub use metrics::{
    EvalSummary, GroupedResults, MetricFn, compute_pass_at_k, compute_pass_at_k_labeled,
    pass_at_k_single,
};
pub use registry::{
    BenchmarkRegistry, get_benchmark, global_registry, list_benchmarks, register_benchmark,
};
pub use report::{EvalReport, ReportFormat, generate_report};
pub use rewards::ExactMatchReward;
pub use runner::{
    EvalConfig, EvalProgress, EvalRun, Evaluator, ProgressCallback, RunStats, expand_samples,
};
pub use sample::{EvalSample, Sample, SampleFailure};
