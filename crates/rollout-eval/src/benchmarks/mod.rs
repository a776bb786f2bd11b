//! Benchmark dataset loaders
//!
//! A [`Benchmark`] turns local data files into [`Task`]s. Loaders are
//! registered by name in the [`BenchmarkRegistry`](crate::registry::BenchmarkRegistry).

mod aime;
mod jsonl;
mod synthetic;

pub use aime::AimeBenchmark;
pub use jsonl::JsonlBenchmark;
pub use synthetic::SyntheticBenchmark;

use std::path::{Path, PathBuf};

use rollout_core::{RolloutError, RolloutResult, Task};
use serde::{Deserialize, Serialize};

/// A named source of tasks
pub trait Benchmark: Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// One-line description for listings
    fn description(&self) -> &str {
        ""
    }

    /// Load every task, in a deterministic order
    fn load_dataset(&self, options: &BenchmarkOptions) -> RolloutResult<Vec<Task>>;
}

/// Options passed to a loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkOptions {
    /// Data file or directory
    #[serde(default)]
    pub data_path: Option<PathBuf>,

    /// Dataset version (e.g. AIME year)
    #[serde(default)]
    pub version: Option<String>,

    /// Only load these scenarios
    #[serde(default)]
    pub scenarios: Option<Vec<String>>,

    /// Cap on tasks taken from each scenario
    #[serde(default)]
    pub max_tasks_per_scenario: Option<usize>,

    /// Cap on the total number of tasks
    #[serde(default)]
    pub limit: Option<usize>,
}

impl BenchmarkOptions {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: Some(data_path.into()),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_scenarios(mut self, scenarios: Vec<String>) -> Self {
        self.scenarios = Some(scenarios);
        self
    }

    pub fn with_max_tasks_per_scenario(mut self, max: usize) -> Self {
        self.max_tasks_per_scenario = Some(max);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The data path, or a config error naming the benchmark
    pub(crate) fn require_data_path(&self, benchmark: &str) -> RolloutResult<&Path> {
        self.data_path.as_deref().ok_or_else(|| {
            RolloutError::config(format!("Benchmark '{}' requires a data path", benchmark))
        })
    }

    pub(crate) fn apply_limit(&self, mut tasks: Vec<Task>) -> Vec<Task> {
        if let Some(limit) = self.limit {
            tasks.truncate(limit);
        }
        tasks
    }
}

/// Parse a file of JSON rows: a JSON array, or one object per line
pub(crate) fn read_json_rows(path: &Path) -> RolloutResult<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RolloutError::io_with_path(
            format!("Failed to read dataset: {}", e),
            path.display().to_string(),
        )
    })?;

    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content).map_err(|e| RolloutError::Json {
            message: format!("Failed to parse dataset: {}", e),
            context: Some(path.display().to_string()),
        });
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| RolloutError::Json {
                message: format!("Invalid row at line {}: {}", idx + 1, e),
                context: Some(path.display().to_string()),
            })
        })
        .collect()
}

/// Render a scalar JSON value as plain text (strings unquoted)
pub(crate) fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
