//! End-to-end tests for the evaluation engine

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rollout::{
    CheckpointStore, Environment, EnvironmentFactory, EvalConfig, EvalSample, Evaluator, Message,
    Observation, RewardResult, RolloutResult, StepResult, Task, TaskContext, compute_pass_at_k,
    pass_at_k_single,
};
use tempfile::TempDir;

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    steps: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

struct CountingEnv {
    counters: Arc<Counters>,
    delay: Duration,
}

#[async_trait]
impl Environment for CountingEnv {
    async fn step(&mut self, task: &Task) -> RolloutResult<StepResult> {
        self.counters.steps.fetch_add(1, Ordering::SeqCst);
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);

        // Even rollouts answer correctly
        let rollout = task.id().and_then(|id| id.rsplit('_').next()).unwrap_or("0");
        let reward = if rollout.parse::<u32>().unwrap_or(0) % 2 == 0 { 1.0 } else { 0.0 };
        Ok(StepResult::new(Observation::new(vec![Message::assistant("42")]))
            .with_reward(RewardResult::new(reward)))
    }
}

struct CountingFactory {
    counters: Arc<Counters>,
    delay: Duration,
}

impl CountingFactory {
    fn new(delay_ms: u64) -> (Arc<Self>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let factory = Arc::new(Self {
            counters: counters.clone(),
            delay: Duration::from_millis(delay_ms),
        });
        (factory, counters)
    }
}

#[async_trait]
impl EnvironmentFactory for CountingFactory {
    async fn create(&self, _task: &Task) -> RolloutResult<Box<dyn Environment>> {
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingEnv {
            counters: self.counters.clone(),
            delay: self.delay,
        }))
    }
}

fn tasks(ids: &[&str]) -> Vec<Task> {
    ids.iter()
        .map(|id| Task::with_context(format!("solve {}", id), TaskContext::new(*id)))
        .collect()
}

#[tokio::test]
async fn test_every_task_gets_n_rollouts() {
    let tmp = TempDir::new().unwrap();
    let (factory, counters) = CountingFactory::new(1);
    let config = EvalConfig::new(tmp.path().join("results.jsonl"))
        .with_n_rollouts(3)
        .with_max_concurrency(4);

    let evaluator = Evaluator::new(config, factory).unwrap();
    let results = evaluator.run(tasks(&["a", "b"])).await.unwrap();

    assert_eq!(counters.steps.load(Ordering::SeqCst), 6);
    assert_eq!(counters.created.load(Ordering::SeqCst), 6);
    assert_eq!(results.len(), 2);
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    for (_, group) in results.iter() {
        assert_eq!(group.len(), 3);
        let rollouts: Vec<u32> = group.iter().map(|s| s.rollout_index).collect();
        assert_eq!(rollouts, vec![0, 1, 2]);
    }
}

#[tokio::test]
async fn test_concurrency_stays_within_limit() {
    let tmp = TempDir::new().unwrap();
    let (factory, counters) = CountingFactory::new(20);
    let config = EvalConfig::new(tmp.path().join("results.jsonl"))
        .with_n_rollouts(4)
        .with_max_concurrency(3);

    let evaluator = Evaluator::new(config, factory).unwrap();
    let results = evaluator.run(tasks(&["a", "b", "c"])).await.unwrap();

    assert_eq!(results.total_samples(), 12);
    let peak = counters.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {} exceeded limit", peak);
    assert!(peak >= 2, "expected parallel execution, peak was {}", peak);
}

#[tokio::test]
async fn test_empty_task_list_runs_nothing() {
    let tmp = TempDir::new().unwrap();
    let (factory, counters) = CountingFactory::new(1);
    let evaluator =
        Evaluator::new(EvalConfig::new(tmp.path().join("results.jsonl")), factory).unwrap();

    let run = evaluator.run_detailed(Vec::new()).await.unwrap();
    assert!(run.results.is_empty());
    assert_eq!(run.stats.total_samples, 0);
    assert_eq!(counters.created.load(Ordering::SeqCst), 0);
    assert_eq!(counters.steps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resume_only_runs_new_samples() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("results.jsonl");
    let config = EvalConfig::new(&output).with_n_rollouts(2).with_max_concurrency(2);

    let (first, first_counters) = CountingFactory::new(1);
    Evaluator::new(config.clone(), first)
        .unwrap()
        .run(tasks(&["a", "b"]))
        .await
        .unwrap();
    assert_eq!(first_counters.steps.load(Ordering::SeqCst), 4);

    let (second, second_counters) = CountingFactory::new(1);
    let run = Evaluator::new(config, second)
        .unwrap()
        .run_detailed(tasks(&["a", "b", "c"]))
        .await
        .unwrap();

    assert_eq!(second_counters.steps.load(Ordering::SeqCst), 2);
    assert_eq!(run.stats.recovered, 4);
    assert_eq!(run.stats.executed, 2);
    assert_eq!(run.results.total_samples(), 6);
    assert_eq!(run.results.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);

    let store = CheckpointStore::open(&output, 1).await.unwrap();
    assert_eq!(store.recovered().len(), 6);

    // Same grouping as a run that was never interrupted
    let (fresh, _) = CountingFactory::new(1);
    let uninterrupted = Evaluator::new(
        EvalConfig::new(tmp.path().join("fresh.jsonl"))
            .with_n_rollouts(2)
            .with_max_concurrency(2),
        fresh,
    )
    .unwrap()
    .run(tasks(&["a", "b", "c"]))
    .await
    .unwrap();

    assert_eq!(
        run.results.keys().collect::<Vec<_>>(),
        uninterrupted.keys().collect::<Vec<_>>()
    );
    for (problem_id, group) in uninterrupted.iter() {
        let resumed = run.results.get(problem_id).unwrap();
        assert_eq!(summarize(resumed), summarize(group), "group {}", problem_id);
    }
}

fn summarize(group: &[EvalSample]) -> Vec<(String, u32, Option<f64>)> {
    group
        .iter()
        .map(|s| (s.sample_id.clone(), s.rollout_index, s.reward()))
        .collect()
}

#[tokio::test]
async fn test_save_interval_one_persists_each_sample() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("results.jsonl");
    let (factory, _) = CountingFactory::new(1);
    let config = EvalConfig::new(&output).with_n_rollouts(3).with_save_interval(1);

    Evaluator::new(config, factory)
        .unwrap()
        .run(tasks(&["only"]))
        .await
        .unwrap();

    let content = tokio::fs::read_to_string(&output).await.unwrap();
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["problem_id"], "only");
    }
}

#[tokio::test]
async fn test_pass_at_k_over_run() {
    let tmp = TempDir::new().unwrap();
    let (factory, _) = CountingFactory::new(1);
    let config = EvalConfig::new(tmp.path().join("results.jsonl"))
        .with_n_rollouts(4)
        .with_k_values(vec![1, 2, 8]);

    let evaluator = Evaluator::new(config, factory).unwrap();
    let results = evaluator.run(tasks(&["a", "b"])).await.unwrap();

    // Two of four rollouts are correct for every task
    let scores = compute_pass_at_k(&results, &[1, 2, 8], 1.0);
    assert!((scores[&1] - 0.5).abs() < 1e-9);
    assert!((scores[&2] - pass_at_k_single(4, 2, 2)).abs() < 1e-9);
    assert_eq!(scores[&8], 0.0);

    let metrics = evaluator.compute_metrics(&results);
    assert!((metrics["pass@1"] - 0.5).abs() < 1e-9);
}

#[test]
fn test_pass_at_k_boundaries() {
    assert_eq!(pass_at_k_single(5, 0, 1), 0.0);
    assert_eq!(pass_at_k_single(5, 5, 3), 1.0);
    assert_eq!(pass_at_k_single(4, 3, 2), 1.0);
    assert!((pass_at_k_single(10, 1, 1) - 0.1).abs() < 1e-9);
    assert!((pass_at_k_single(4, 2, 2) - (1.0 - 1.0 / 6.0)).abs() < 1e-9);
}
