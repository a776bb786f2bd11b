//! Execution backend traits
//!
//! An [`Environment`] turns a [`Task`] into a [`StepResult`]. The engine asks an
//! [`EnvironmentFactory`] for a fresh instance per sample, drives it through
//! `reset` → `step` → `cleanup`, and never shares an instance across samples.

use async_trait::async_trait;
use std::future::Future;

use crate::error::RolloutResult;
use crate::types::{StepResult, Task};

/// A rollout environment for a single sample
#[async_trait]
pub trait Environment: Send {
    /// Prepare for a new episode
    async fn reset(&mut self) -> RolloutResult<()> {
        Ok(())
    }

    /// Run one episode and report what happened.
    ///
    /// Timeouts and agent-side errors should surface as a terminal
    /// [`StepResult`]; an `Err` means no outcome could be produced at all.
    async fn step(&mut self, task: &Task) -> RolloutResult<StepResult>;

    /// Release resources held by the environment
    async fn cleanup(&mut self) -> RolloutResult<()> {
        Ok(())
    }
}

/// Builds one environment per sample.
///
/// Called concurrently, once per sample, so implementations must be safe to
/// share across in-flight executions.
#[async_trait]
pub trait EnvironmentFactory: Send + Sync {
    async fn create(&self, task: &Task) -> RolloutResult<Box<dyn Environment>>;
}

/// Adapter turning an async closure into an [`EnvironmentFactory`]
pub struct FnEnvironmentFactory<F> {
    f: F,
}

impl<F> FnEnvironmentFactory<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> EnvironmentFactory for FnEnvironmentFactory<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = RolloutResult<Box<dyn Environment>>> + Send,
{
    async fn create(&self, task: &Task) -> RolloutResult<Box<dyn Environment>> {
        (self.f)(task.clone()).await
    }
}

/// Wrap an async closure as an environment factory
pub fn env_factory_fn<F, Fut>(f: F) -> FnEnvironmentFactory<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = RolloutResult<Box<dyn Environment>>> + Send,
{
    FnEnvironmentFactory::new(f)
}
