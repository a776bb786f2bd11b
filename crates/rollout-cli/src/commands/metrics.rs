//! Score an existing checkpoint log

use anyhow::{Result, bail};
use rollout_eval::checkpoint::CheckpointStore;
use rollout_eval::report::{EvalReport, ReportFormat, generate_report};
use rollout_eval::{EvalConfig, GroupedResults, compute_pass_at_k_labeled};

use crate::args::MetricsArgs;

/// Group the log by problem, compute pass@k and print the report
pub async fn execute(args: MetricsArgs) -> Result<()> {
    let format: ReportFormat = args.format.parse()?;
    if !args.input.is_file() {
        bail!("Checkpoint log not found: {}", args.input.display());
    }

    // Opening the store dedupes repeated sample ids the same way a resume would
    let store = CheckpointStore::open(&args.input, 1).await?;
    let results: GroupedResults = store.recovered().iter().cloned().collect();

    let config = EvalConfig::new(&args.input)
        .with_k_values(args.k.clone())
        .with_reward_threshold(args.reward_threshold);
    config.validate()?;

    let metrics = compute_pass_at_k_labeled(&results, &args.k, args.reward_threshold);
    let report = EvalReport::new(args.benchmark, config, &results, metrics);

    println!("{}", generate_report(&report, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollout_core::{Observation, RewardResult, StepResult, Task};
    use rollout_eval::Sample;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(input: PathBuf) -> MetricsArgs {
        MetricsArgs {
            input,
            k: vec![1],
            reward_threshold: 1.0,
            benchmark: "checkpoint".to_string(),
            format: "json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_scores_existing_log() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.jsonl");

        let mut store = CheckpointStore::open(&path, 1).await.unwrap();
        for (i, reward) in [1.0, 0.0].into_iter().enumerate() {
            let record = Sample {
                sample_id: format!("p_{}", i),
                problem_id: "p".to_string(),
                rollout_index: i as u32,
                task: Task::new("q"),
            }
            .complete(StepResult::new(Observation::default()).with_reward(RewardResult::new(reward)));
            store.append(record).await.unwrap();
        }

        execute(args(path)).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_log_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(execute(args(tmp.path().join("absent.jsonl"))).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_format_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut bad = args(tmp.path().join("absent.jsonl"));
        bad.format = "html".to_string();
        let err = execute(bad).await.unwrap_err();
        assert!(err.to_string().contains("html"));
    }
}
