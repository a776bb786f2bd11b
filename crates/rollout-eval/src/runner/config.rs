//! Evaluation configuration
//!
//! Configuration options for running evaluations.

use rollout_core::{RolloutError, RolloutResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for evaluation runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of samples per task (for pass@k)
    #[serde(default = "default_n_rollouts")]
    pub n_rollouts: u32,

    /// Maximum number of samples executing at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Checkpoint log path
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Completed samples buffered between checkpoint flushes
    #[serde(default = "default_save_interval")]
    pub save_interval: usize,

    /// Minimum reward for a sample to count as correct
    #[serde(default = "default_reward_threshold")]
    pub reward_threshold: f64,

    /// k values reported by the default pass@k metric
    #[serde(default = "default_k_values")]
    pub k_values: Vec<usize>,

    /// Whether raw token ids are kept in checkpoint records
    #[serde(default)]
    pub keep_tokens: bool,
}

fn default_n_rollouts() -> u32 {
    1
}

fn default_max_concurrency() -> usize {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("results.jsonl")
}

fn default_save_interval() -> usize {
    10
}

fn default_reward_threshold() -> f64 {
    1.0
}

fn default_k_values() -> Vec<usize> {
    vec![1]
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            n_rollouts: default_n_rollouts(),
            max_concurrency: default_max_concurrency(),
            output_path: default_output_path(),
            save_interval: default_save_interval(),
            reward_threshold: default_reward_threshold(),
            k_values: default_k_values(),
            keep_tokens: false,
        }
    }
}

impl EvalConfig {
    /// Create a config writing its checkpoint to `output_path`
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    /// Load a config file; format is picked from the extension
    /// (`.yaml`/`.yml`, `.toml`, anything else is JSON)
    pub fn from_file(path: impl AsRef<Path>) -> RolloutResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RolloutError::io_with_path(
                format!("Failed to read config file: {}", e),
                path.display().to_string(),
            )
        })?;

        let config: EvalConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content).map_err(|e| {
                RolloutError::config_with_context(e.to_string(), path.display().to_string())
            })?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Set number of rollouts per task
    pub fn with_n_rollouts(mut self, n: u32) -> Self {
        self.n_rollouts = n;
        self
    }

    /// Set the concurrency cap
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Set the checkpoint log path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the flush interval
    pub fn with_save_interval(mut self, interval: usize) -> Self {
        self.save_interval = interval;
        self
    }

    /// Set the correctness threshold
    pub fn with_reward_threshold(mut self, threshold: f64) -> Self {
        self.reward_threshold = threshold;
        self
    }

    /// Set the reported k values
    pub fn with_k_values(mut self, k_values: Vec<usize>) -> Self {
        self.k_values = k_values;
        self
    }

    /// Keep raw token ids in checkpoint records
    pub fn keep_tokens(mut self) -> Self {
        self.keep_tokens = true;
        self
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> RolloutResult<()> {
        if self.n_rollouts < 1 {
            return Err(RolloutError::config("n_rollouts must be >= 1"));
        }
        if self.max_concurrency < 1 {
            return Err(RolloutError::config("max_concurrency must be >= 1"));
        }
        if self.save_interval < 1 {
            return Err(RolloutError::config("save_interval must be >= 1"));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(RolloutError::config("output_path must not be empty"));
        }
        if !self.reward_threshold.is_finite() {
            return Err(RolloutError::config(format!(
                "reward_threshold must be finite, got {}",
                self.reward_threshold
            )));
        }
        Ok(())
    }
}
