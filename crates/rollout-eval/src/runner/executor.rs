//! Evaluation executor
//!
//! Expands tasks into samples, skips the ones the checkpoint log already has,
//! runs the rest through the concurrency controller and folds everything into
//! grouped results.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use rollout_core::{EnvironmentFactory, RolloutResult, Task};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::controller::ConcurrencyController;
use super::expander::expand_samples;
use super::EvalConfig;
use crate::checkpoint::CheckpointStore;
use crate::metrics::{GroupedResults, MetricFn, ResultAggregator, pass_at_k_metric};
use crate::sample::SampleFailure;

/// Callback for progress updates during evaluation
pub type ProgressCallback = Box<dyn Fn(EvalProgress) + Send + Sync>;

/// Progress update, sent once per finished sample
#[derive(Debug, Clone)]
pub struct EvalProgress {
    /// Samples finished in this run (succeeded or failed)
    pub completed: usize,
    /// Samples this run has to execute
    pub total: usize,
    pub sample_id: String,
    pub succeeded: bool,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Size of the expanded work list
    pub total_samples: usize,
    /// Taken from the checkpoint log instead of executed
    pub recovered: usize,
    /// Executed and checkpointed in this run
    pub executed: usize,
    /// Executed without producing an outcome
    pub failed: usize,
    pub elapsed_secs: f64,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct EvalRun {
    pub results: GroupedResults,
    pub failures: Vec<SampleFailure>,
    pub stats: RunStats,
}

/// Runs tasks against environments with resumable checkpointing
pub struct Evaluator {
    config: EvalConfig,
    factory: Arc<dyn EnvironmentFactory>,
    metric_fns: Vec<MetricFn>,
    progress_callback: Option<ProgressCallback>,
}

impl Evaluator {
    /// Create an evaluator; the config is validated here
    pub fn new(config: EvalConfig, factory: Arc<dyn EnvironmentFactory>) -> RolloutResult<Self> {
        config.validate()?;
        let default_metric = pass_at_k_metric(config.k_values.clone(), config.reward_threshold);

        Ok(Self {
            config,
            factory,
            metric_fns: vec![default_metric],
            progress_callback: None,
        })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Set progress callback
    pub fn set_progress_callback(&mut self, callback: ProgressCallback) {
        self.progress_callback = Some(callback);
    }

    /// Add a metric applied by [`Evaluator::compute_metrics`]
    pub fn with_metric(mut self, metric: MetricFn) -> Self {
        self.metric_fns.push(metric);
        self
    }

    /// Replace every metric, including the default pass@k
    pub fn with_metrics(mut self, metrics: Vec<MetricFn>) -> Self {
        self.metric_fns = metrics;
        self
    }

    /// Run the tasks and return the grouped results
    pub async fn run(&self, tasks: impl IntoIterator<Item = Task>) -> RolloutResult<GroupedResults> {
        Ok(self.run_detailed(tasks).await?.results)
    }

    /// Run the tasks, also reporting failures and counters
    pub async fn run_detailed(&self, tasks: impl IntoIterator<Item = Task>) -> RolloutResult<EvalRun> {
        let start = Instant::now();
        let tasks: Vec<Task> = tasks.into_iter().collect();
        let samples = expand_samples(&tasks, self.config.n_rollouts)?;

        info!(
            tasks = tasks.len(),
            samples = samples.len(),
            n_rollouts = self.config.n_rollouts,
            max_concurrency = self.config.max_concurrency,
            output = %self.config.output_path.display(),
            "Starting evaluation"
        );

        let mut store =
            CheckpointStore::open(&self.config.output_path, self.config.save_interval).await?;
        let mut aggregator = ResultAggregator::new(samples.len());
        let mut stats = RunStats {
            total_samples: samples.len(),
            ..Default::default()
        };

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut pending = Vec::new();
        for (idx, sample) in samples.into_iter().enumerate() {
            match store.get_recovered(&sample.sample_id) {
                Some(record) => {
                    let mut record = record.clone();
                    if record.problem_id != sample.problem_id {
                        warn!(
                            sample_id = %sample.sample_id,
                            logged = %record.problem_id,
                            expected = %sample.problem_id,
                            "Checkpointed problem id differs from task list"
                        );
                        record.problem_id = sample.problem_id;
                    }
                    aggregator.insert(idx, record);
                    stats.recovered += 1;
                }
                None => {
                    positions.insert(sample.sample_id.clone(), idx);
                    pending.push(sample);
                }
            }
        }

        let unrelated = store.recovered().len() - stats.recovered;
        if unrelated > 0 {
            debug!(count = unrelated, "Checkpoint records outside this task list ignored");
        }
        info!(
            recovered = stats.recovered,
            pending = pending.len(),
            "Resolved work list against checkpoint"
        );

        let mut failures = Vec::new();
        let total = pending.len();

        if total > 0 {
            let controller = ConcurrencyController::new(self.config.max_concurrency);
            let mut completions = controller.execute(pending, Arc::clone(&self.factory));
            let mut completed = 0usize;

            while let Some(execution) = completions.recv().await {
                completed += 1;
                let sample_id = execution.sample.sample_id.clone();
                let succeeded = execution.result.is_ok();

                match execution.result {
                    Ok(mut step_result) => {
                        if !self.config.keep_tokens {
                            step_result.observation.token_ids = None;
                        }
                        let idx = positions.get(&sample_id).copied();
                        let record = execution.sample.complete(step_result);
                        debug!(
                            sample_id = %sample_id,
                            problem_id = %record.problem_id,
                            reward = ?record.reward(),
                            elapsed_ms = execution.elapsed.as_millis() as u64,
                            "Sample completed"
                        );

                        store.append(record.clone()).await?;
                        if let Some(idx) = idx {
                            aggregator.insert(idx, record);
                        }
                        stats.executed += 1;
                    }
                    Err(e) => {
                        error!(
                            sample_id = %sample_id,
                            problem_id = %execution.sample.problem_id,
                            error = %e,
                            "Sample execution failed"
                        );
                        let failure = SampleFailure::new(&execution.sample, e.to_string());
                        if let Err(log_err) = store.record_failure(&failure).await {
                            warn!(sample_id = %sample_id, error = %log_err, "Failed to record sample failure");
                        }
                        failures.push(failure);
                        stats.failed += 1;
                    }
                }

                if let Some(ref callback) = self.progress_callback {
                    callback(EvalProgress {
                        completed,
                        total,
                        sample_id,
                        succeeded,
                    });
                }
            }
        }

        store.flush().await?;
        stats.elapsed_secs = start.elapsed().as_secs_f64();

        let results = aggregator.finish();
        info!(
            problems = results.len(),
            samples = results.total_samples(),
            executed = stats.executed,
            recovered = stats.recovered,
            failed = stats.failed,
            elapsed_secs = stats.elapsed_secs,
            "Evaluation complete"
        );

        Ok(EvalRun {
            results,
            failures,
            stats,
        })
    }

    /// Apply every registered metric; later metrics win on a label clash
    pub fn compute_metrics(&self, results: &GroupedResults) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        for metric in &self.metric_fns {
            metrics.extend(metric(results));
        }
        metrics
    }
}
