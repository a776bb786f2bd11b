//! Rollout evaluation CLI
//!
//! ```bash
//! rollout benchmarks
//! rollout run aime --data aime_2024.jsonl --command ./agent.sh -n 8 -k 1,8
//! rollout metrics results.jsonl -k 1,8
//! ```
//!
//! Re-running `rollout run` with the same `--output` resumes from the
//! checkpoint log.

mod args;
mod commands;
mod router;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose only raises the fallback level
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    router::route(cli).await
}
