//! Per-pair pipeline: hedge ratio, spread, z-score, signals, backtest.

use pairs_core::error::{DataError, PairsError};
use pairs_core::traits::StrategyConfig;
use pairs_core::types::PairSeries;
use pairs_indicators::{compute_spread, zscore_series, HedgeRatioConfig, HedgeRatioEstimator, ZScoreMethod};
use pairs_strategy::{SignalConfig, ZScoreSignalGenerator};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::report::{BacktestReport, EquityPoint};
use crate::statistics::{daily_returns, drawdown_curve, rolling_sharpe};
use crate::{BacktestConfig, BacktestEngine, BacktestResult, PerformanceStats};

/// Everything needed to run one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub hedge: HedgeRatioConfig,
    pub zscore: ZScoreMethod,
    pub signals: SignalConfig,
    pub backtest: BacktestConfig,
    /// Window of the rolling Sharpe column
    pub rolling_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hedge: HedgeRatioConfig::default(),
            zscore: ZScoreMethod::default(),
            signals: SignalConfig::default(),
            backtest: BacktestConfig::default(),
            rolling_window: 60,
        }
    }
}

/// One row of the results file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRecord {
    pub date: String,
    pub timestamp: i64,
    pub price_a: f64,
    pub price_b: f64,
    pub hedge_ratio: f64,
    pub spread: f64,
    pub zscore: f64,
    pub long_signal: bool,
    pub short_signal: bool,
    pub exit_signal: bool,
    pub portfolio_value: f64,
    pub drawdown: f64,
    pub rolling_sharpe: f64,
}

/// Output of one pair run.
#[derive(Debug, Clone)]
pub struct PairRun {
    /// Pair label, e.g. `V/AXP`
    pub pair: String,
    pub rows: Vec<BarRecord>,
    pub result: BacktestResult,
    pub stats: PerformanceStats,
    pub config: BacktestConfig,
}

impl PairRun {
    /// Build the report for this run.
    pub fn report(&self) -> BacktestReport {
        BacktestReport {
            pair: self.pair.clone(),
            config: self.config,
            stats: self.stats.clone(),
            equity_curve: self
                .rows
                .iter()
                .map(|row| EquityPoint {
                    date: row.date.clone(),
                    value: row.portfolio_value,
                })
                .collect(),
        }
    }
}

/// Validated components of the pipeline.
#[derive(Debug, Clone)]
pub struct PairPipeline {
    estimator: HedgeRatioEstimator,
    zscore: ZScoreMethod,
    signals: ZScoreSignalGenerator,
    engine: BacktestEngine,
    rolling_window: usize,
}

impl PairPipeline {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: &PipelineConfig) -> Result<Self, PairsError> {
        config.signals.validate()?;
        if !config.backtest.rates_in_range() {
            warn!(
                commission_rate = config.backtest.commission_rate,
                borrow_rate = config.backtest.borrow_rate,
                "Rates outside [0, 1)"
            );
        }
        if config.rolling_window < 2 {
            return Err(PairsError::Config(format!(
                "rolling_window must be at least 2, got {}",
                config.rolling_window
            )));
        }

        Ok(Self {
            estimator: HedgeRatioEstimator::new(config.hedge)?,
            zscore: config.zscore,
            signals: ZScoreSignalGenerator::new(config.signals)?,
            engine: BacktestEngine::new(config.backtest),
            rolling_window: config.rolling_window,
        })
    }

    /// Run every stage over `series`.
    pub fn run(&self, series: &PairSeries) -> Result<PairRun, PairsError> {
        let pair = series.label();
        if !series.is_strictly_ordered() {
            return Err(DataError::Unordered { source_name: pair }.into());
        }
        info!(pair = %pair, bars = series.len(), "Running pair");

        let hedge = self.estimator.estimate(series.pairs())?;
        let spread = compute_spread(series.pairs(), &hedge)?;
        let zscores = zscore_series(&spread, self.zscore)?;
        let bars = self.signals.generate(&spread, &zscores)?;
        let result = self.engine.simulate(&bars);

        if !result.all_finite() {
            warn!(pair = %pair, "Portfolio values contain non-finite entries");
        }

        let stats = PerformanceStats::from_result(&result);
        let drawdown = drawdown_curve(&result.portfolio_values);
        let sharpe = rolling_sharpe(&daily_returns(&result.portfolio_values), self.rolling_window);

        let rows = series
            .iter()
            .enumerate()
            .map(|(i, obs)| BarRecord {
                date: obs.datetime().format("%Y-%m-%d").to_string(),
                timestamp: obs.timestamp,
                price_a: obs.price_a,
                price_b: obs.price_b,
                hedge_ratio: hedge[i],
                spread: spread[i],
                zscore: zscores[i],
                long_signal: bars[i].long_signal,
                short_signal: bars[i].short_signal,
                exit_signal: bars[i].exit_signal,
                portfolio_value: result.portfolio_values[i],
                drawdown: drawdown[i],
                rolling_sharpe: sharpe[i],
            })
            .collect();

        info!(
            pair = %pair,
            trades = stats.total_trades,
            total_return_pct = stats.total_return_pct,
            sharpe = stats.sharpe_ratio,
            "Pair complete"
        );

        Ok(PairRun {
            pair,
            rows,
            result,
            stats,
            config: *self.engine.config(),
        })
    }
}
