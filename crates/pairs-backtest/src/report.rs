//! Backtest report generation.

use serde::{Deserialize, Serialize};

use crate::{BacktestConfig, PerformanceStats};

const RULE: &str = "───────────────────────────────────────────────────────────\n";
const BANNER: &str = "═══════════════════════════════════════════════════════════\n";

/// Portfolio value on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub date: String,
    pub value: f64,
}

/// Complete report for one pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Pair label, e.g. `V/AXP`
    pub pair: String,
    /// Configuration used
    pub config: BacktestConfig,
    /// Statistics
    pub stats: PerformanceStats,
    /// Portfolio value per bar
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestReport {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let stats = &self.stats;
        let mut s = String::new();

        s.push_str(BANNER);
        s.push_str(&format!("  PAIRS BACKTEST REPORT: {}\n", self.pair));
        s.push_str(BANNER);
        s.push('\n');

        s.push_str("PERFORMANCE\n");
        s.push_str(RULE);
        s.push_str(&format!("  Initial Value:       ${:.2}\n", stats.initial_value));
        s.push_str(&format!("  Final Value:         ${:.2}\n", stats.final_value));
        s.push_str(&format!("  Total Return:        {:.4}%\n", stats.total_return_pct));
        s.push_str(&format!("  Annualized Return:   {:.4}%\n", stats.annualized_return_pct));
        s.push_str(&format!(
            "  Max Drawdown:        ${:.2} ({:.4}%)\n",
            stats.max_drawdown, stats.max_drawdown_pct
        ));
        s.push('\n');

        s.push_str("RISK METRICS\n");
        s.push_str(RULE);
        s.push_str(&format!("  Sharpe Ratio:        {:.4}\n", stats.sharpe_ratio));
        s.push_str(&format!("  Sortino Ratio:       {:.4}\n", stats.sortino_ratio));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", stats.profit_factor));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str(RULE);
        s.push_str(&format!("  Total Trades:        {}\n", stats.total_trades));
        s.push_str(&format!(
            "  Won / Lost / Even:   {} / {} / {}\n",
            stats.winning_trades, stats.losing_trades, stats.breakeven_trades
        ));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", stats.win_rate_pct));
        s.push_str(&format!("  Avg Win:             {:.4}\n", stats.avg_win));
        s.push_str(&format!("  Avg Loss:            {:.4}\n", stats.avg_loss));
        s.push_str(&format!("  Avg Holding:         {:.1} bars\n", stats.avg_holding_bars));
        s.push('\n');

        s.push_str("COSTS\n");
        s.push_str(RULE);
        s.push_str(&format!(
            "  Commission:          ${:.2} ({:.4}% per trade)\n",
            stats.total_commission,
            self.config.commission_rate * 100.0
        ));
        s.push_str(&format!(
            "  Borrow Fees:         ${:.2} ({:.4}% p.a.)\n",
            stats.total_borrow_fees,
            self.config.borrow_rate * 100.0
        ));
        s.push_str(&format!("  Bars Processed:      {}\n", stats.bars_processed));
        s.push('\n');

        s.push_str(BANNER);
        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the equity curve as CSV.
    pub fn equity_to_csv(&self) -> String {
        let mut csv = String::from("date,portfolio_value\n");
        for point in &self.equity_curve {
            csv.push_str(&format!("{},{}\n", point.date, point.value));
        }
        csv
    }
}
