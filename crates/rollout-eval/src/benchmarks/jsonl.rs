//! Generic one-task-per-line datasets

use std::path::{Path, PathBuf};

use rollout_core::{Message, RolloutError, RolloutResult, Task, TaskContext};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{Benchmark, BenchmarkOptions, read_json_rows, value_to_string};

const RESERVED: &[&str] = &[
    "id",
    "message",
    "prompt",
    "ground_truth",
    "answer",
    "conversation_history",
];

/// Reads `{id?, message|prompt, ground_truth?|answer?, ...}` rows from a file
/// or from every `.jsonl` file under a directory.
///
/// Fields outside the known set are kept in the task context.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlBenchmark;

impl JsonlBenchmark {
    fn dataset_files(path: &Path) -> RolloutResult<Vec<PathBuf>> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        if !path.is_dir() {
            return Err(RolloutError::not_found_resource(
                format!("Dataset not found: {}", path.display()),
                "dataset",
            ));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();
        Ok(files)
    }

    fn parse_row(row: serde_json::Value, file: &Path, line: usize) -> RolloutResult<Task> {
        let serde_json::Value::Object(mut fields) = row else {
            return Err(RolloutError::Json {
                message: format!("Row {} is not a JSON object", line),
                context: Some(file.display().to_string()),
            });
        };

        let message = fields
            .get("message")
            .or_else(|| fields.get("prompt"))
            .and_then(value_to_string)
            .ok_or_else(|| {
                RolloutError::not_found_resource(
                    format!(
                        "Row {} of {} has neither 'message' nor 'prompt'",
                        line,
                        file.display()
                    ),
                    "field",
                )
            })?;

        let mut context = TaskContext::default();
        context.id = fields.get("id").and_then(value_to_string);
        context.ground_truth = fields
            .get("ground_truth")
            .or_else(|| fields.get("answer"))
            .and_then(value_to_string);

        if let Some(history) = fields.remove("conversation_history") {
            context.conversation_history = serde_json::from_value::<Vec<Message>>(history)
                .map_err(|e| RolloutError::Json {
                    message: format!("Row {} has invalid conversation_history: {}", line, e),
                    context: Some(file.display().to_string()),
                })?;
        }

        for (key, value) in fields {
            if !RESERVED.contains(&key.as_str()) {
                context.insert(key, value);
            }
        }

        Ok(Task::with_context(message, context))
    }
}

impl Benchmark for JsonlBenchmark {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn description(&self) -> &str {
        "Generic JSONL tasks: {id, message|prompt, ground_truth|answer}"
    }

    fn load_dataset(&self, options: &BenchmarkOptions) -> RolloutResult<Vec<Task>> {
        let path = options.require_data_path(self.name())?;
        let files = Self::dataset_files(path)?;

        let mut tasks = Vec::new();
        for file in &files {
            let rows = read_json_rows(file)?;
            debug!(file = %file.display(), rows = rows.len(), "Reading dataset file");
            for (idx, row) in rows.into_iter().enumerate() {
                tasks.push(Self::parse_row(row, file, idx + 1)?);
            }
        }

        info!(files = files.len(), tasks = tasks.len(), "Loaded JSONL tasks");
        Ok(options.apply_limit(tasks))
    }
}
