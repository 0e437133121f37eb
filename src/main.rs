//! Pairs trading backtester CLI.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use logging::setup_logging;
use pairs_config::load_config_or_default;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // CLI flags win over the config file
    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json_logs = cli.json_logs || config.logging.format == "json";
    let _guard = setup_logging(&log_level, json_logs, config.logging.file.as_deref())?;

    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, config).await,
        Commands::Run(args) => cli::commands::run::run(args, config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, &config),
    }
}
