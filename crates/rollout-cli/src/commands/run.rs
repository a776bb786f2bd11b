//! Run a benchmark end to end

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use rollout_eval::registry::BenchmarkRegistry;
use rollout_eval::report::{EvalReport, ReportFormat, generate_report};
use rollout_eval::{
    BenchmarkOptions, CommandConfig, CommandEnvironmentFactory, EvalConfig, EvalProgress,
    Evaluator, ExactMatchReward,
};
use tracing::info;

use crate::args::{EvalOverrides, RunArgs};

/// Load the benchmark, evaluate it and print the report
pub async fn execute(args: RunArgs, registry: &BenchmarkRegistry) -> Result<()> {
    let format: ReportFormat = args.format.parse()?;
    let benchmark = registry.get(&args.benchmark)?;

    let config = match &args.config {
        Some(path) => EvalConfig::from_file(path)?,
        None => EvalConfig::default(),
    };
    let config = apply_overrides(config, &args.eval);

    let mut options = BenchmarkOptions {
        data_path: args.data.clone(),
        version: args.dataset_version.clone(),
        scenarios: args.scenarios.clone(),
        max_tasks_per_scenario: args.max_tasks_per_scenario,
        limit: args.limit,
    };
    if options.data_path.is_none() {
        options.data_path = Some(std::env::current_dir()?);
    }

    let tasks = benchmark
        .load_dataset(&options)
        .with_context(|| format!("Failed to load benchmark '{}'", args.benchmark))?;
    if tasks.is_empty() {
        bail!("Benchmark '{}' produced no tasks", args.benchmark);
    }
    info!(benchmark = %args.benchmark, tasks = tasks.len(), "Loaded benchmark");

    let mut command = CommandConfig::new(&args.command);
    if let Some(secs) = args.timeout_secs {
        command = command.with_timeout_secs(secs);
    }
    if let Some(dir) = &args.working_dir {
        command = command.with_working_dir(dir);
    }
    let factory =
        CommandEnvironmentFactory::new(command).with_reward(Arc::new(ExactMatchReward::new()));

    let mut evaluator = Evaluator::new(config.clone(), Arc::new(factory))?;
    evaluator.set_progress_callback(Box::new(|progress: EvalProgress| {
        eprintln!(
            "[{}/{}] {} {}",
            progress.completed,
            progress.total,
            progress.sample_id,
            if progress.succeeded { "done" } else { "FAILED" }
        );
    }));

    eprintln!(
        "Evaluating {} tasks x {} rollouts (checkpoint: {})\n",
        tasks.len(),
        config.n_rollouts,
        config.output_path.display()
    );

    let run = evaluator.run_detailed(tasks).await?;
    let metrics = evaluator.compute_metrics(&run.results);
    let report = EvalReport::from_run(args.benchmark.clone(), config, &run, metrics);

    let rendered = generate_report(&report, format)?;
    println!("{}", rendered);

    if let Some(path) = &args.report {
        tokio::fs::write(path, &rendered)
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    if run.stats.failed > 0 {
        eprintln!(
            "\n{} samples failed and were not checkpointed; re-run the same command to retry them.",
            run.stats.failed
        );
    }

    Ok(())
}

/// Flags take precedence over the config file
fn apply_overrides(mut config: EvalConfig, overrides: &EvalOverrides) -> EvalConfig {
    if let Some(n) = overrides.n_rollouts {
        config.n_rollouts = n;
    }
    if let Some(max) = overrides.max_concurrency {
        config.max_concurrency = max;
    }
    if let Some(ref path) = overrides.output {
        config.output_path = path.clone();
    }
    if let Some(interval) = overrides.save_interval {
        config.save_interval = interval;
    }
    if let Some(threshold) = overrides.reward_threshold {
        config.reward_threshold = threshold;
    }
    if let Some(ref k) = overrides.k {
        config.k_values = k.clone();
    }
    if overrides.keep_tokens {
        config.keep_tokens = true;
    }
    config
}
