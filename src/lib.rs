//! Resumable rollout evaluation
//!
//! Umbrella crate re-exporting the data model and traits from
//! [`rollout_core`] and the evaluation engine from [`rollout_eval`].

pub use rollout_core as core;
pub use rollout_eval as eval;

pub use rollout_core::{
    Environment, EnvironmentFactory, Message, Observation, RewardFunction, RewardResult,
    RolloutError, RolloutResult, StepResult, Task, TaskContext, TerminationReason, TokenUsage,
    env_factory_fn,
};
pub use rollout_eval::{
    Benchmark, BenchmarkOptions, BenchmarkRegistry, CheckpointStore, EvalConfig, EvalRun,
    EvalSample, Evaluator, GroupedResults, compute_pass_at_k, compute_pass_at_k_labeled,
    get_benchmark, list_benchmarks, pass_at_k_single, register_benchmark,
};
