//! Run every configured pair concurrently.

use anyhow::{bail, Context, Result};
use pairs_backtest::{BacktestReport, PairPipeline, PairRun};
use pairs_config::AppConfig;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::{backtest_pair, results_path, save_results};
use crate::cli::{OutputFormat, RunArgs};

pub async fn run(args: RunArgs, config: AppConfig) -> Result<()> {
    if config.pairs.is_empty() {
        bail!("No pairs configured. Add [[pairs]] entries to the config file");
    }

    let pipeline = PairPipeline::new(&config.pipeline_config()).context("Invalid configuration")?;
    let config = Arc::new(config);
    info!(pairs = config.pairs.len(), "Running all pairs");

    let mut tasks = JoinSet::new();
    for (index, pair) in config.pairs.iter().cloned().enumerate() {
        let config = Arc::clone(&config);
        let pipeline = pipeline.clone();
        tasks.spawn(async move {
            let result = backtest_pair(&config, pipeline, &pair).await;
            (index, pair, result)
        });
    }

    let mut completed: Vec<(usize, PairRun)> = Vec::new();
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        let (index, pair, result) = joined.context("Pair task panicked")?;
        match result {
            Ok(run) => {
                if !args.no_results {
                    let path = results_path(&config, &pair, None);
                    if let Err(e) = save_results(&path, &run) {
                        error!(pair = %pair.label(), "{:#}", e);
                    }
                }
                completed.push((index, run));
            }
            Err(e) => {
                failures += 1;
                error!(pair = %pair.label(), "Pair failed: {:#}", e);
            }
        }
    }

    // Report in configuration order
    completed.sort_by_key(|(index, _)| *index);
    let reports: Vec<BacktestReport> = completed.iter().map(|(_, run)| run.report()).collect();

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                println!("{}", report.summary());
            }
        }
    }

    info!(succeeded = completed.len(), failed = failures, "All pairs finished");
    if completed.is_empty() {
        bail!("Every pair failed");
    }
    Ok(())
}
