//! Command routing logic for CLI

use anyhow::Result;
use rollout_eval::registry::global_registry;

use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Benchmarks => commands::benchmarks::list(global_registry()),
        Commands::Run(args) => commands::run::execute(args, global_registry()).await,
        Commands::Metrics(args) => commands::metrics::execute(args).await,
    }
}
