//! Bounded-concurrency sample execution

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use rollout_core::{EnvironmentFactory, RolloutError, RolloutResult, StepResult};
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, warn};

use crate::sample::Sample;

/// What came back from running one sample
#[derive(Debug)]
pub struct SampleExecution {
    pub sample: Sample,
    pub result: RolloutResult<StepResult>,
    pub elapsed: Duration,
}

/// Runs samples against fresh environments with at most `max_concurrency`
/// in flight at any moment.
///
/// Each sample gets its own environment from the factory and is driven
/// through `reset`, `step` and `cleanup`. Cleanup runs whenever the
/// environment was created, whatever happened in between.
#[derive(Debug, Clone)]
pub struct ConcurrencyController {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl ConcurrencyController {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Start executing `samples`, returning completions in the order they
    /// finish.
    ///
    /// Samples are started in the order given. Dropping the receiver stops
    /// new samples from starting; samples already in flight run to the end.
    pub fn execute(
        &self,
        samples: Vec<Sample>,
        factory: Arc<dyn EnvironmentFactory>,
    ) -> mpsc::Receiver<SampleExecution> {
        let (tx, rx) = mpsc::channel(self.max_concurrency);
        let semaphore = Arc::clone(&self.semaphore);

        tokio::spawn(async move {
            for sample in samples {
                if tx.is_closed() {
                    debug!("Result receiver dropped, not starting remaining samples");
                    break;
                }

                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let tx = tx.clone();
                let factory = Arc::clone(&factory);
                tokio::spawn(async move {
                    let execution = execute_sample(sample, factory).await;
                    drop(permit);
                    // The receiver may be gone; nothing left to report to
                    let _ = tx.send(execution).await;
                });
            }
        });

        rx
    }
}

async fn execute_sample(sample: Sample, factory: Arc<dyn EnvironmentFactory>) -> SampleExecution {
    let start = Instant::now();
    debug!(sample_id = %sample.sample_id, "Starting sample");

    let result = run_environment(&sample, factory.as_ref()).await;

    SampleExecution {
        sample,
        result,
        elapsed: start.elapsed(),
    }
}

async fn run_environment(
    sample: &Sample,
    factory: &dyn EnvironmentFactory,
) -> RolloutResult<StepResult> {
    let created = AssertUnwindSafe(factory.create(&sample.task))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(panicked(sample, "factory", panic)));
    let mut env = created.map_err(|e| {
        RolloutError::execution(
            &sample.sample_id,
            format!("failed to create environment: {}", e),
        )
    })?;

    // Catch panics from reset/step only, so cleanup below still runs
    let outcome = AssertUnwindSafe(async {
        env.reset().await?;
        env.step(&sample.task).await
    })
    .catch_unwind()
    .await
    .unwrap_or_else(|panic| Err(panicked(sample, "environment", panic)));

    if let Err(e) = env.cleanup().await {
        warn!(sample_id = %sample.sample_id, error = %e, "Environment cleanup failed");
    }

    outcome.map_err(|e| match e {
        RolloutError::Execution { .. } => e,
        other => RolloutError::execution(&sample.sample_id, other.to_string()),
    })
}

fn panicked(sample: &Sample, source: &str, panic: Box<dyn Any + Send>) -> RolloutError {
    let reason = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    RolloutError::execution(&sample.sample_id, format!("{} panicked: {}", source, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rollout_core::{Environment, Observation, Task, TaskContext};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        created: AtomicUsize,
        cleaned: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    struct TestEnv {
        counters: Arc<Counters>,
        mode: String,
    }

    #[async_trait]
    impl Environment for TestEnv {
        async fn reset(&mut self) -> RolloutResult<()> {
            if self.mode == "reset-fail" {
                return Err(RolloutError::other("reset refused"));
            }
            Ok(())
        }

        async fn step(&mut self, _task: &Task) -> RolloutResult<StepResult> {
            let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.counters.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.mode.as_str() {
                "fail" => return Err(RolloutError::other("agent crashed")),
                "panic" => panic!("boom"),
                _ => {}
            }
            Ok(StepResult::new(Observation::default()))
        }

        async fn cleanup(&mut self) -> RolloutResult<()> {
            self.counters.cleaned.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct TestFactory {
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl EnvironmentFactory for TestFactory {
        async fn create(&self, task: &Task) -> RolloutResult<Box<dyn Environment>> {
            self.counters.created.fetch_add(1, Ordering::SeqCst);
            if task.message == "no-env" {
                return Err(RolloutError::config("no environment for task"));
            }
            Ok(Box::new(TestEnv {
                counters: Arc::clone(&self.counters),
                mode: task.message.clone(),
            }))
        }
    }

    fn samples(messages: &[&str]) -> Vec<Sample> {
        messages
            .iter()
            .enumerate()
            .map(|(i, message)| Sample {
                sample_id: format!("p{}_0", i),
                problem_id: format!("p{}", i),
                rollout_index: 0,
                task: Task::with_context(*message, TaskContext::new(format!("p{}_0", i))),
            })
            .collect()
    }

    async fn drain(mut rx: mpsc::Receiver<SampleExecution>) -> Vec<SampleExecution> {
        let mut out = Vec::new();
        while let Some(execution) = rx.recv().await {
            out.push(execution);
        }
        out
    }

    #[tokio::test]
    async fn test_in_flight_never_exceeds_limit() {
        let counters = Arc::new(Counters::default());
        let factory = Arc::new(TestFactory {
            counters: Arc::clone(&counters),
        });
        let controller = ConcurrencyController::new(3);

        let results = drain(controller.execute(samples(&["ok"; 12]), factory)).await;

        assert_eq!(results.len(), 12);
        assert!(results.iter().all(|r| r.result.is_ok()));
        assert!(counters.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(counters.created.load(Ordering::SeqCst), 12);
    }

    #[tokio::test]
    async fn test_failures_are_reported_and_cleaned_up() {
        let counters = Arc::new(Counters::default());
        let factory = Arc::new(TestFactory {
            counters: Arc::clone(&counters),
        });
        let controller = ConcurrencyController::new(2);

        let results = drain(controller.execute(samples(&["ok", "fail", "no-env"]), factory)).await;

        assert_eq!(results.len(), 3);
        let failed: Vec<_> = results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(failed.len(), 2);
        for execution in failed {
            let err = execution.result.as_ref().unwrap_err();
            assert!(err.is_retryable());
            assert!(err.to_string().contains(&execution.sample.sample_id));
        }
        // The environment that never got created has nothing to clean up
        assert_eq!(counters.cleaned.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_panicking_step_still_cleans_up() {
        let counters = Arc::new(Counters::default());
        let factory = Arc::new(TestFactory {
            counters: Arc::clone(&counters),
        });
        let controller = ConcurrencyController::new(1);

        let results = drain(controller.execute(samples(&["panic", "ok"]), factory)).await;

        assert_eq!(results.len(), 2);
        let panicked = results
            .iter()
            .find(|r| r.sample.task.message == "panic")
            .unwrap();
        let err = panicked.result.as_ref().unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(counters.cleaned.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_reset_skips_step_and_cleans_up() {
        let counters = Arc::new(Counters::default());
        let factory = Arc::new(TestFactory {
            counters: Arc::clone(&counters),
        });
        let controller = ConcurrencyController::new(1);

        let results = drain(controller.execute(samples(&["reset-fail"]), factory)).await;

        assert_eq!(results.len(), 1);
        let err = results[0].result.as_ref().unwrap_err();
        assert!(err.to_string().contains("reset refused"));
        // step never ran, so nothing was ever in flight
        assert_eq!(counters.peak.load(Ordering::SeqCst), 0);
        assert_eq!(counters.cleaned.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_is_clamped() {
        let controller = ConcurrencyController::new(0);
        assert_eq!(controller.max_concurrency(), 1);
    }
}
