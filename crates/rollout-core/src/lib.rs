//! Core types for rollout evaluation
//!
//! This crate holds what environments and the evaluation engine agree on:
//! the task/outcome data model, the environment and reward traits, and the
//! shared error type.

pub mod environment;
pub mod error;
pub mod reward;
pub mod types;

pub use environment::{Environment, EnvironmentFactory, FnEnvironmentFactory, env_factory_fn};
pub use error::{ResultExt, RolloutError, RolloutResult};
pub use reward::RewardFunction;
pub use types::{
    Message, Observation, RewardResult, Role, StepResult, Task, TaskContext, TerminationReason,
    TokenUsage,
};
