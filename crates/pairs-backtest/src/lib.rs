//! Spread backtesting: engine, statistics, reports and the per-pair pipeline.

mod engine;
mod pipeline;
mod report;
mod statistics;

pub use engine::{BacktestConfig, BacktestEngine, BacktestResult, StepOutcome, TradeEvent};
pub use pipeline::{BarRecord, PairPipeline, PairRun, PipelineConfig};
pub use report::{BacktestReport, EquityPoint};
pub use statistics::{daily_returns, drawdown_curve, rolling_sharpe, PerformanceStats, TradeRecord};
