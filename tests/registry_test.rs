//! Benchmark registry and loader tests through the public API

use std::sync::Arc;

use rollout::{Benchmark, BenchmarkOptions, BenchmarkRegistry, RolloutError, RolloutResult, Task};
use tempfile::TempDir;

struct Fixed(&'static str);

impl Benchmark for Fixed {
    fn name(&self) -> &str {
        self.0
    }

    fn load_dataset(&self, _options: &BenchmarkOptions) -> RolloutResult<Vec<Task>> {
        Ok(vec![Task::new(self.0)])
    }
}

#[test]
fn test_registry_names_are_sorted_and_unique() {
    let registry = BenchmarkRegistry::new();
    registry.register(Arc::new(Fixed("zeta"))).unwrap();
    registry.register(Arc::new(Fixed("alpha"))).unwrap();

    assert_eq!(registry.list(), vec!["alpha", "zeta"]);

    let err = registry.register(Arc::new(Fixed("zeta"))).unwrap_err();
    assert!(matches!(err, RolloutError::Conflict { .. }));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_unknown_benchmark_lists_available() {
    let registry = BenchmarkRegistry::new();
    registry.register(Arc::new(Fixed("alpha"))).unwrap();

    let err = registry.get("missing").err().unwrap();
    assert!(matches!(err, RolloutError::NotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("missing"));
    assert!(message.contains("alpha"));
}

#[test]
fn test_builtins_load_aime_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("aime.jsonl");
    std::fs::write(
        &path,
        "{\"id\": 1, \"problem\": \"Find x.\", \"answer\": \"204\"}\n\
         {\"id\": 2, \"problem\": \"Find y.\", \"answer\": 7}\n",
    )
    .unwrap();

    let registry = BenchmarkRegistry::with_builtins();
    assert!(registry.contains("aime"));
    assert!(registry.contains("synthetic"));

    let tasks = registry
        .get("aime")
        .unwrap()
        .load_dataset(&BenchmarkOptions::new(&path))
        .unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id(), Some("AIME_2024_1"));
    assert_eq!(tasks[1].ground_truth(), Some("7"));
}
