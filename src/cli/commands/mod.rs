//! CLI command implementations.

pub mod backtest;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use pairs_backtest::{PairPipeline, PairRun};
use pairs_config::{AppConfig, PairSettings};
use pairs_data::{load_pair, write_results, ColumnSpec, CsvPriceSource};
use std::path::{Path, PathBuf};
use tracing::info;

/// CSV source for one pair, honoring per-pair file overrides.
fn price_source(config: &AppConfig, pair: &PairSettings) -> CsvPriceSource {
    let columns = ColumnSpec::new(&config.data.date_column, &config.data.price_column);
    let mut source = CsvPriceSource::new(&config.data.dir).with_columns(columns);
    if let Some(file) = &pair.file_a {
        source = source.with_file(&pair.ticker_a, file);
    }
    if let Some(file) = &pair.file_b {
        source = source.with_file(&pair.ticker_b, file);
    }
    source
}

/// Load a pair and run the pipeline on a blocking thread.
async fn backtest_pair(config: &AppConfig, pipeline: PairPipeline, pair: &PairSettings) -> Result<PairRun> {
    let source = price_source(config, pair);
    let series = load_pair(&source, &pair.ticker_a, &pair.ticker_b)
        .await
        .with_context(|| format!("Failed to load prices for {}", pair.label()))?;
    info!(pair = %pair.label(), bars = series.len(), "Loaded pair");

    let run = tokio::task::spawn_blocking(move || pipeline.run(&series))
        .await
        .context("Pipeline task panicked")??;
    Ok(run)
}

fn results_path(config: &AppConfig, pair: &PairSettings, explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.data.output_dir.join(pair.results_file_name()))
}

fn save_results(path: &Path, run: &PairRun) -> Result<()> {
    write_results(path, &run.rows).with_context(|| format!("Failed to write {}", path.display()))
}
