//! Backtest command implementation.

use anyhow::{Context, Result};
use pairs_backtest::{BacktestReport, PairPipeline};
use pairs_config::{AppConfig, PairSettings};
use std::path::Path;
use tracing::info;

use super::{backtest_pair, results_path, save_results};
use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, mut config: AppConfig) -> Result<()> {
    let mut pair = match (&args.ticker_a, &args.ticker_b) {
        (Some(a), Some(b)) => config
            .pairs
            .iter()
            .find(|p| &p.ticker_a == a && &p.ticker_b == b)
            .cloned()
            .unwrap_or_else(|| PairSettings::new(a, b)),
        _ => config
            .pairs
            .first()
            .cloned()
            .context("No pair given. Use --ticker-a/--ticker-b or add a [[pairs]] entry to the config")?,
    };
    if let Some(file) = &args.file_a {
        pair.file_a = Some(file.clone());
    }
    if let Some(file) = &args.file_b {
        pair.file_b = Some(file.clone());
    }

    apply_overrides(&args, &mut config);
    info!(pair = %pair.label(), "Starting backtest");

    let pipeline = PairPipeline::new(&config.pipeline_config()).context("Invalid configuration")?;
    let run = backtest_pair(&config, pipeline, &pair).await?;
    let report = run.report();

    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)
            .with_context(|| format!("Failed to save report to {}", save_path.display()))?;
        info!("Report saved to {:?}", save_path);
    }

    if let Some(equity_path) = &args.equity {
        save_equity(equity_path, &report)?;
        info!("Equity curve saved to {:?}", equity_path);
    }

    let path = results_path(&config, &pair, args.results.as_deref());
    save_results(&path, &run)?;

    Ok(())
}

fn save_equity(path: &Path, report: &BacktestReport) -> Result<()> {
    std::fs::write(path, report.equity_to_csv())
        .with_context(|| format!("Failed to save equity curve to {}", path.display()))
}

fn apply_overrides(args: &BacktestArgs, config: &mut AppConfig) {
    if let Some(capital) = args.capital {
        config.backtest.initial_cash = capital;
    }
    if let Some(commission) = args.commission {
        config.backtest.commission_rate = commission;
    }
    if let Some(borrow_rate) = args.borrow_rate {
        config.backtest.borrow_rate = borrow_rate;
    }
    if let Some(entry_z) = args.entry_z {
        config.signals.entry_z = entry_z;
    }
    if let Some(exit_z) = args.exit_z {
        config.signals.exit_z = exit_z;
    }
}
