//! AIME math competition problems

use rollout_core::{RolloutResult, Task, TaskContext};
use tracing::{info, warn};

use super::{Benchmark, BenchmarkOptions, read_json_rows, value_to_string};

const DEFAULT_VERSION: &str = "2024";

/// Loads `{id?, problem, answer}` rows from a local JSON or JSONL export
#[derive(Debug, Default, Clone, Copy)]
pub struct AimeBenchmark;

impl Benchmark for AimeBenchmark {
    fn name(&self) -> &str {
        "aime"
    }

    fn description(&self) -> &str {
        "AIME competition math, exact-match answers"
    }

    fn load_dataset(&self, options: &BenchmarkOptions) -> RolloutResult<Vec<Task>> {
        let path = options.require_data_path(self.name())?;
        let version = options.version.as_deref().unwrap_or(DEFAULT_VERSION);
        let prefix = format!("AIME_{}", version);

        let rows = read_json_rows(path)?;
        let total = rows.len();
        let mut tasks = Vec::with_capacity(total);

        for (idx, row) in rows.iter().enumerate() {
            let problem = row.get("problem").and_then(value_to_string);
            let answer = row.get("answer").and_then(value_to_string);
            let (Some(problem), Some(answer)) = (problem, answer) else {
                warn!(benchmark = %prefix, row = idx, "Missing problem/answer, row skipped");
                continue;
            };

            let row_id = row
                .get("id")
                .and_then(value_to_string)
                .unwrap_or_else(|| idx.to_string());

            tasks.push(Task::with_context(
                problem,
                TaskContext::new(format!("{}_{}", prefix, row_id)).with_ground_truth(answer),
            ));
        }

        info!(benchmark = %prefix, loaded = tasks.len(), total, "Loaded problems");
        Ok(options.apply_limit(tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loads_rows_and_skips_incomplete() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aime.jsonl");
        std::fs::write(
            &path,
            concat!(
                "{\"id\": 60, \"problem\": \"Find x.\", \"answer\": \"204\"}\n",
                "{\"problem\": \"No answer here\"}\n",
                "{\"problem\": \"Find y.\", \"answer\": 25}\n",
            ),
        )
        .unwrap();

        let tasks = AimeBenchmark
            .load_dataset(&BenchmarkOptions::new(&path).with_version("2025"))
            .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id(), Some("AIME_2025_60"));
        assert_eq!(tasks[0].ground_truth(), Some("204"));
        assert_eq!(tasks[1].id(), Some("AIME_2025_2"));
        assert_eq!(tasks[1].ground_truth(), Some("25"));
    }

    #[test]
    fn test_default_version_and_limit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aime.json");
        std::fs::write(
            &path,
            r#"[{"problem": "a", "answer": "1"}, {"problem": "b", "answer": "2"}]"#,
        )
        .unwrap();

        let tasks = AimeBenchmark
            .load_dataset(&BenchmarkOptions::new(&path).with_limit(1))
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id(), Some("AIME_2024_0"));
    }
}
