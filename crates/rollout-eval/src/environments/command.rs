//! Shell-command environment
//!
//! Runs one shell command per sample. The task message is written to the
//! command's stdin and its stdout becomes the assistant response.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rollout_core::{
    Environment, EnvironmentFactory, Message, Observation, RewardFunction, RolloutError,
    RolloutResult, StepResult, Task, TerminationReason,
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Environment variable carrying the sample id
pub const TASK_ID_ENV: &str = "ROLLOUT_TASK_ID";
/// Environment variable carrying the ground truth, when the task has one
pub const GROUND_TRUTH_ENV: &str = "ROLLOUT_GROUND_TRUTH";

/// How to run the command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Passed to `sh -c`
    pub command: String,

    /// Per-sample time budget; no limit when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl CommandConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout_secs: None,
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Runs [`CommandConfig::command`] for a single sample
pub struct CommandEnvironment {
    config: Arc<CommandConfig>,
    reward_fn: Option<Arc<dyn RewardFunction>>,
}

impl CommandEnvironment {
    pub fn new(config: Arc<CommandConfig>, reward_fn: Option<Arc<dyn RewardFunction>>) -> Self {
        Self { config, reward_fn }
    }

    fn build_command(&self, task: &Task) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", &self.config.command]);
        cmd.env(TASK_ID_ENV, task.id().unwrap_or_default());
        if let Some(ground_truth) = task.ground_truth() {
            cmd.env(GROUND_TRUTH_ENV, ground_truth);
        }
        cmd.envs(&self.config.env);
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, task: &Task) -> RolloutResult<StepResult> {
        let sample_id = task.id().unwrap_or("unknown").to_string();
        let start = Instant::now();

        let mut child = self.build_command(task).spawn().map_err(|e| {
            RolloutError::execution(&sample_id, format!("Failed to spawn command: {}", e))
        })?;

        // Fed from its own task so a chatty command cannot deadlock on a full pipe
        if let Some(mut stdin) = child.stdin.take() {
            let input = task.message.clone().into_bytes();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    debug!(error = %e, "Command closed stdin early");
                }
            });
        }

        let output = match self.config.timeout() {
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => {
                    warn!(sample_id = %sample_id, timeout_secs = limit.as_secs(), "Command timed out");
                    let observation = Observation::new(vec![Message::user(task.message.clone())])
                        .with_metric("error", format!("timed out after {}s", limit.as_secs()))
                        .with_metric("duration_ms", start.elapsed().as_millis() as u64);
                    return Ok(StepResult::new(observation)
                        .with_termination(TerminationReason::Timeout));
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| {
            RolloutError::execution(&sample_id, format!("Failed to wait for command: {}", e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        let mut observation = Observation::new(vec![
            Message::user(task.message.clone()),
            Message::assistant(stdout),
        ])
        .with_metric("duration_ms", start.elapsed().as_millis() as u64);
        if let Some(code) = output.status.code() {
            observation = observation.with_metric("exit_code", code);
        }

        let termination = if output.status.success() {
            TerminationReason::TaskComplete
        } else {
            let message = if stderr.is_empty() {
                format!("Command failed with exit code: {:?}", output.status.code())
            } else {
                stderr
            };
            observation = observation.with_metric("error", message);
            TerminationReason::Error
        };

        Ok(StepResult::new(observation).with_termination(termination))
    }
}

#[async_trait]
impl Environment for CommandEnvironment {
    async fn step(&mut self, task: &Task) -> RolloutResult<StepResult> {
        let mut result = self.run(task).await?;
        if let Some(reward_fn) = &self.reward_fn {
            if let Some(reward) = reward_fn.compute(task, &result).await? {
                result = result.with_reward(reward);
            }
        }
        Ok(result)
    }
}

/// Hands out a [`CommandEnvironment`] per sample
#[derive(Clone)]
pub struct CommandEnvironmentFactory {
    config: Arc<CommandConfig>,
    reward_fn: Option<Arc<dyn RewardFunction>>,
}

impl CommandEnvironmentFactory {
    pub fn new(config: CommandConfig) -> Self {
        Self {
            config: Arc::new(config),
            reward_fn: None,
        }
    }

    /// Score every step with `reward_fn`
    pub fn with_reward(mut self, reward_fn: Arc<dyn RewardFunction>) -> Self {
        self.reward_fn = Some(reward_fn);
        self
    }

    pub fn config(&self) -> &CommandConfig {
        &self.config
    }
}

#[async_trait]
impl EnvironmentFactory for CommandEnvironmentFactory {
    async fn create(&self, _task: &Task) -> RolloutResult<Box<dyn Environment>> {
        Ok(Box::new(CommandEnvironment::new(
            Arc::clone(&self.config),
            self.reward_fn.clone(),
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::rewards::ExactMatchReward;
    use rollout_core::TaskContext;

    async fn step(config: CommandConfig, task: &Task) -> RolloutResult<StepResult> {
        let factory = CommandEnvironmentFactory::new(config);
        let mut env = factory.create(task).await?;
        env.reset().await?;
        let result = env.step(task).await;
        env.cleanup().await?;
        result
    }

    #[tokio::test]
    async fn test_stdin_becomes_response() {
        let task = Task::with_context("hello world", TaskContext::new("p1_0"));
        let result = step(CommandConfig::new("cat"), &task).await.unwrap();

        assert_eq!(result.termination_reason, TerminationReason::TaskComplete);
        assert_eq!(result.observation.final_response(), Some("hello world"));
        assert_eq!(result.observation.metrics["exit_code"], 0);
    }

    #[tokio::test]
    async fn test_task_env_vars() {
        let task = Task::with_context(
            "",
            TaskContext::new("p7_2").with_ground_truth("42"),
        );
        let config = CommandConfig::new(
            "printf '%s|%s|%s' \"$ROLLOUT_TASK_ID\" \"$ROLLOUT_GROUND_TRUTH\" \"$EXTRA\"",
        )
        .with_env("EXTRA", "x");
        let result = step(config, &task).await.unwrap();
        assert_eq!(result.observation.final_response(), Some("p7_2|42|x"));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_terminal_error() {
        let task = Task::with_context("q", TaskContext::new("p1_0"));
        let result = step(CommandConfig::new("echo nope >&2; exit 3"), &task)
            .await
            .unwrap();

        assert_eq!(result.termination_reason, TerminationReason::Error);
        assert_eq!(result.observation.metrics["error"], "nope");
        assert_eq!(result.observation.metrics["exit_code"], 3);
    }

    #[tokio::test]
    async fn test_timeout_is_terminal_outcome() {
        let task = Task::with_context("q", TaskContext::new("p1_0"));
        let config = CommandConfig::new("sleep 5").with_timeout_secs(1);
        let result = step(config, &task).await.unwrap();
        assert_eq!(result.termination_reason, TerminationReason::Timeout);
    }

    #[tokio::test]
    async fn test_reward_attached() {
        let task = Task::with_context(
            "ignored",
            TaskContext::new("p1_0").with_ground_truth("204"),
        );
        let factory = CommandEnvironmentFactory::new(CommandConfig::new("printf '%s' '\\boxed{204}'"))
            .with_reward(Arc::new(ExactMatchReward));
        let mut env = factory.create(&task).await.unwrap();
        let result = env.step(&task).await.unwrap();
        assert_eq!(result.reward_value(), Some(1.0));
    }

    #[tokio::test]
    async fn test_missing_working_dir_fails_execution() {
        let task = Task::with_context("q", TaskContext::new("p1_0"));
        let config = CommandConfig::new("true").with_working_dir("/nonexistent/rollout/dir");
        let err = step(config, &task).await.unwrap_err();
        assert_eq!(err.error_code(), "ROLLOUT_EXECUTION");
    }
}
