//! Reward function trait
//!
//! Rewards are computed by environments; the engine only reads the scalar
//! already attached to a [`StepResult`].

use async_trait::async_trait;

use crate::error::RolloutResult;
use crate::types::{RewardResult, StepResult, Task};

/// Scores a finished step
#[async_trait]
pub trait RewardFunction: Send + Sync {
    /// Return `None` when the task cannot be scored (e.g. no ground truth)
    async fn compute(&self, task: &Task, step: &StepResult) -> RolloutResult<Option<RewardResult>>;
}
