//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pairs")]
#[command(author, version, about = "Kalman-filtered pairs trading backtester")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = pairs_config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log level (defaults to `logging.level` from the config)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Backtest a single pair
    Backtest(BacktestArgs),
    /// Backtest every configured pair concurrently
    Run(RunArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Dependent leg (defaults to the first configured pair)
    #[arg(short = 'a', long, requires = "ticker_b")]
    pub ticker_a: Option<String>,

    /// Hedge leg
    #[arg(short = 'b', long, requires = "ticker_a")]
    pub ticker_b: Option<String>,

    /// Price file of leg A (defaults to `<data.dir>/<TICKER>.csv`)
    #[arg(long)]
    pub file_a: Option<PathBuf>,

    /// Price file of leg B
    #[arg(long)]
    pub file_b: Option<PathBuf>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<f64>,

    /// Commission rate per trade, as a fraction of cash
    #[arg(long)]
    pub commission: Option<f64>,

    /// Annualized short borrow rate
    #[arg(long)]
    pub borrow_rate: Option<f64>,

    /// Entry z-score threshold
    #[arg(long)]
    pub entry_z: Option<f64>,

    /// Exit z-score threshold
    #[arg(long)]
    pub exit_z: Option<f64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Save the JSON report to a file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Per-bar results CSV (defaults to `<data.output_dir>/results_A_B.csv`)
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Write the equity curve as CSV
    #[arg(long)]
    pub equity: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Do not write per-bar results files
    #[arg(long)]
    pub no_results: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backtest() {
        let cli = Cli::parse_from([
            "pairs",
            "--log-level",
            "debug",
            "backtest",
            "-a",
            "V",
            "-b",
            "AXP",
            "--borrow-rate",
            "0.01",
            "--output",
            "json",
            "--equity",
            "equity.csv",
        ]);
        assert!(matches!(cli.log_level, Some(LogLevel::Debug)));
        let Commands::Backtest(args) = cli.command else {
            panic!("expected backtest");
        };
        assert_eq!(args.ticker_a.as_deref(), Some("V"));
        assert_eq!(args.borrow_rate, Some(0.01));
        assert!(args.output == OutputFormat::Json);
        assert_eq!(args.equity, Some(PathBuf::from("equity.csv")));
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["pairs", "validate-config"]);
        assert_eq!(cli.config, PathBuf::from(pairs_config::DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_ticker_requires_both_legs() {
        assert!(Cli::try_parse_from(["pairs", "backtest", "-a", "V"]).is_err());
    }
}
