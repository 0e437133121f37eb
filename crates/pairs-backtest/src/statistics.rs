//! Backtest statistics.

use pairs_core::types::Position;
use pairs_core::TRADING_DAYS_PER_YEAR;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::engine::BacktestResult;

/// Record of a completed round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Position,
    /// Bar index of the entry
    pub entry_index: usize,
    /// Bar index of the exit
    pub exit_index: usize,
    pub entry_spread: f64,
    pub exit_spread: f64,
    /// Realized P&L in spread units
    pub pnl: f64,
    /// Commission paid on entry and exit
    pub commission: f64,
}

impl TradeRecord {
    /// Number of bars the position was held.
    pub fn holding_bars(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

/// Performance statistics of one backtest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// First portfolio value
    pub initial_value: f64,
    /// Last portfolio value
    pub final_value: f64,
    /// Total return percentage
    pub total_return_pct: f64,
    /// Annualized return percentage (252 bars per year)
    pub annualized_return_pct: f64,
    /// Largest peak-to-trough decline in currency
    pub max_drawdown: f64,
    /// Largest peak-to-trough decline as a percentage of the peak
    pub max_drawdown_pct: f64,
    /// Annualized Sharpe ratio (risk-free rate of 0)
    pub sharpe_ratio: f64,
    /// Annualized Sortino ratio
    pub sortino_ratio: f64,
    /// Total number of completed trades
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub breakeven_trades: usize,
    /// Win rate percentage
    pub win_rate_pct: f64,
    /// Average P&L of winning trades
    pub avg_win: f64,
    /// Average absolute P&L of losing trades
    pub avg_loss: f64,
    /// Gross profit / gross loss
    pub profit_factor: f64,
    /// Average holding period in bars
    pub avg_holding_bars: f64,
    /// Commission paid
    pub total_commission: f64,
    /// Borrow fees paid
    pub total_borrow_fees: f64,
    /// Number of bars processed
    pub bars_processed: usize,
}

impl PerformanceStats {
    /// Calculate statistics from a finished simulation.
    pub fn from_result(result: &BacktestResult) -> Self {
        let values = &result.portfolio_values;
        let mut stats = Self {
            bars_processed: values.len(),
            total_commission: result.total_commission,
            total_borrow_fees: result.total_borrow_fees,
            ..Default::default()
        };

        let (Some(&first), Some(&last)) = (values.first(), values.last()) else {
            return stats;
        };
        stats.initial_value = first;
        stats.final_value = last;

        // Total and annualized return
        if first != 0.0 {
            let total_return = last / first - 1.0;
            stats.total_return_pct = total_return * 100.0;
            let years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
            // A wiped-out account cannot compound; report a total loss
            stats.annualized_return_pct = if 1.0 + total_return > 0.0 {
                ((1.0 + total_return).powf(1.0 / years) - 1.0) * 100.0
            } else {
                -100.0
            };
        }

        // Drawdown
        let mut peak = f64::NEG_INFINITY;
        for &value in values {
            peak = peak.max(value);
            let drawdown = peak - value;
            stats.max_drawdown = stats.max_drawdown.max(drawdown);
            if peak > 0.0 {
                stats.max_drawdown_pct = stats.max_drawdown_pct.max(drawdown / peak * 100.0);
            }
        }

        // Sharpe and Sortino
        let returns = daily_returns(values);
        let mean = returns.iter().mean();
        let std_dev = returns.iter().population_std_dev();
        if std_dev > 0.0 {
            stats.sharpe_ratio = mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt();
        }

        let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
        if !downside.is_empty() {
            let downside_dev = downside.iter().population_std_dev();
            if downside_dev > 0.0 {
                stats.sortino_ratio = mean / downside_dev * TRADING_DAYS_PER_YEAR.sqrt();
            }
        }

        stats.add_trades(&result.trades);
        stats
    }

    fn add_trades(&mut self, trades: &[TradeRecord]) {
        let mut total_profit = 0.0;
        let mut total_loss = 0.0;

        for trade in trades {
            if trade.pnl > 0.0 {
                self.winning_trades += 1;
                total_profit += trade.pnl;
            } else if trade.pnl < 0.0 {
                self.losing_trades += 1;
                total_loss += trade.pnl.abs();
            } else {
                self.breakeven_trades += 1;
            }
        }
        self.total_trades = trades.len();

        if self.total_trades > 0 {
            self.win_rate_pct = self.winning_trades as f64 * 100.0 / self.total_trades as f64;
            self.avg_holding_bars = trades.iter().map(|t| t.holding_bars() as f64).sum::<f64>()
                / self.total_trades as f64;
        }
        if self.winning_trades > 0 {
            self.avg_win = total_profit / self.winning_trades as f64;
        }
        if self.losing_trades > 0 {
            self.avg_loss = total_loss / self.losing_trades as f64;
        }
        if total_loss > 0.0 {
            self.profit_factor = total_profit / total_loss;
        }
    }
}

/// Simple returns between consecutive values; the first return is 0.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(values.len());
    if values.is_empty() {
        return returns;
    }
    returns.push(0.0);
    for w in values.windows(2) {
        let ret = if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 };
        returns.push(ret);
    }
    returns
}

/// Drawdown from the running peak, as a fraction (0 at new highs, negative below).
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak != 0.0 {
                (v - peak) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized Sharpe ratio over a trailing window of returns.
///
/// Uses the sample standard deviation. The first `window - 1` values, and
/// windows with zero deviation, are NaN.
pub fn rolling_sharpe(returns: &[f64], window: usize) -> Vec<f64> {
    if window < 2 {
        return vec![f64::NAN; returns.len()];
    }
    let mut result = vec![f64::NAN; returns.len().min(window - 1)];
    for w in returns.windows(window) {
        let mean = w.iter().mean();
        let std_dev = w.iter().std_dev();
        result.push(if std_dev > 0.0 {
            mean / std_dev * TRADING_DAYS_PER_YEAR.sqrt()
        } else {
            f64::NAN
        });
    }
    result
}
