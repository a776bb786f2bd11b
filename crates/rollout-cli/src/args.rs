//! CLI argument definitions using clap
//!
//! - rollout benchmarks                      # List registered benchmarks
//! - rollout run aime --data aime.jsonl ...  # Evaluate a benchmark
//! - rollout metrics results.jsonl           # Score an existing checkpoint log

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rollout")]
#[command(about = "Resumable rollout evaluation with pass@k metrics")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered benchmarks
    Benchmarks,

    /// Run a benchmark against a shell-command environment
    Run(RunArgs),

    /// Compute pass@k from an existing checkpoint log
    Metrics(MetricsArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Benchmark name (see `rollout benchmarks`)
    pub benchmark: String,

    /// Dataset file or directory
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Dataset version (e.g. AIME year)
    #[arg(long)]
    pub dataset_version: Option<String>,

    /// Only load these scenarios (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub scenarios: Option<Vec<String>>,

    /// Cap on tasks per scenario
    #[arg(long)]
    pub max_tasks_per_scenario: Option<usize>,

    /// Cap on the total number of tasks
    #[arg(long)]
    pub limit: Option<usize>,

    /// Shell command run once per sample; the task arrives on stdin
    #[arg(long, env = "ROLLOUT_COMMAND")]
    pub command: String,

    /// Per-sample timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Working directory for the command
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Evaluation config file (YAML, TOML or JSON); flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub eval: EvalOverrides,

    /// Report format: table, markdown or json
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Also write the report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Evaluation settings that override the config file
#[derive(Args, Debug, Default)]
pub struct EvalOverrides {
    /// Rollouts per task
    #[arg(long, short = 'n')]
    pub n_rollouts: Option<u32>,

    /// Maximum samples in flight
    #[arg(long, short = 'j')]
    pub max_concurrency: Option<usize>,

    /// Checkpoint log path
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Completed samples per checkpoint flush
    #[arg(long)]
    pub save_interval: Option<usize>,

    /// Minimum reward counted as correct
    #[arg(long)]
    pub reward_threshold: Option<f64>,

    /// k values to report (comma-separated)
    #[arg(long, short = 'k', value_delimiter = ',')]
    pub k: Option<Vec<usize>>,

    /// Keep raw token ids in checkpoint records
    #[arg(long)]
    pub keep_tokens: bool,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Checkpoint log to score
    pub input: PathBuf,

    /// k values to report (comma-separated)
    #[arg(long, short = 'k', value_delimiter = ',', default_value = "1")]
    pub k: Vec<usize>,

    /// Minimum reward counted as correct
    #[arg(long, default_value_t = 1.0)]
    pub reward_threshold: f64,

    /// Label used for the report
    #[arg(long, default_value = "checkpoint")]
    pub benchmark: String,

    /// Report format: table, markdown or json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "rollout", "run", "aime", "--data", "aime.jsonl", "--command", "./agent.sh", "-n", "4",
            "-k", "1,4", "--keep-tokens",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.benchmark, "aime");
        assert_eq!(args.eval.n_rollouts, Some(4));
        assert_eq!(args.eval.k, Some(vec![1, 4]));
        assert!(args.eval.keep_tokens);
        assert_eq!(args.format, "table");
    }

    #[test]
    fn test_parse_metrics_defaults() {
        let cli = Cli::try_parse_from(["rollout", "-v", "metrics", "results.jsonl"]).unwrap();
        assert!(cli.verbose);
        let Commands::Metrics(args) = cli.command else {
            panic!("expected metrics");
        };
        assert_eq!(args.k, vec![1]);
        assert_eq!(args.reward_threshold, 1.0);
    }
}
