//! Synthetic agentic scenarios
//!
//! Expects a data directory holding `gen_tasks.jsonl`, one scenario per line:
//!
//! ```text
//! {"scenario": "shop", "tasks": ["Buy a lamp", "Cancel order 12"]}
//! ```

use std::path::Path;

use rollout_core::{RolloutError, RolloutResult, Task, TaskContext};
use serde::Deserialize;
use tracing::{info, warn};

use super::{Benchmark, BenchmarkOptions, read_json_rows, value_to_string};

pub const TASKS_FILE: &str = "gen_tasks.jsonl";

#[derive(Debug, Deserialize)]
struct ScenarioRow {
    scenario: String,
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticBenchmark;

impl SyntheticBenchmark {
    fn load_scenarios(data_dir: &Path) -> RolloutResult<Vec<ScenarioRow>> {
        let path = data_dir.join(TASKS_FILE);
        if !path.is_file() {
            return Err(RolloutError::not_found_resource(
                format!("{} not found in {}", TASKS_FILE, data_dir.display()),
                "dataset",
            ));
        }

        read_json_rows(&path)?
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| RolloutError::Json {
                    message: format!("Invalid scenario row: {}", e),
                    context: Some(path.display().to_string()),
                })
            })
            .collect()
    }
}

impl Benchmark for SyntheticBenchmark {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn description(&self) -> &str {
        "Generated multi-scenario agent tasks (gen_tasks.jsonl)"
    }

    fn load_dataset(&self, options: &BenchmarkOptions) -> RolloutResult<Vec<Task>> {
        let data_dir = options.require_data_path(self.name())?;
        let scenarios = Self::load_scenarios(data_dir)?;

        let selected: Vec<&ScenarioRow> = match &options.scenarios {
            Some(names) => names
                .iter()
                .filter_map(|name| {
                    let found = scenarios.iter().find(|row| &row.scenario == name);
                    if found.is_none() {
                        warn!(scenario = %name, "Scenario not found in data, skipping");
                    }
                    found
                })
                .collect(),
            None => scenarios.iter().collect(),
        };

        let data_dir_str = data_dir.display().to_string();
        let mut tasks = Vec::new();

        for row in &selected {
            let limit = options
                .max_tasks_per_scenario
                .unwrap_or(row.tasks.len())
                .min(row.tasks.len());

            for (task_idx, message) in row.tasks.iter().take(limit).enumerate() {
                let Some(message) = value_to_string(message) else {
                    warn!(scenario = %row.scenario, task_idx, "Empty task, skipped");
                    continue;
                };

                let context = TaskContext::new(format!("{}_{}", row.scenario, task_idx))
                    .with_extra("scenario", row.scenario.clone())
                    .with_extra("task_idx", task_idx as u64)
                    .with_extra("data_dir", data_dir_str.clone());
                tasks.push(Task::with_context(message, context));
            }
        }

        info!(
            scenarios = selected.len(),
            tasks = tasks.len(),
            data_dir = %data_dir_str,
            "Loaded synthetic tasks"
        );
        Ok(options.apply_limit(tasks))
    }
}
