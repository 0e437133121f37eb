//! Spread backtesting engine.
//!
//! A single spread position is simulated bar by bar. Cash only changes on
//! entry and exit (commission, realized P&L) and while short (borrow fee);
//! open positions are not marked to market.

use pairs_core::types::{PortfolioState, Position, SignalBar};
use pairs_core::TRADING_DAYS_PER_YEAR;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::statistics::TradeRecord;

/// Backtest configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting cash
    pub initial_cash: f64,
    /// Fraction of cash charged on every entry and exit
    pub commission_rate: f64,
    /// Annualized short borrow rate, charged daily as `rate / 252`
    pub borrow_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: 1_000_000.0,
            commission_rate: 0.00125,
            borrow_rate: 0.0025,
        }
    }
}

impl BacktestConfig {
    /// Check both rates lie in `[0, 1)`.
    ///
    /// The engine runs with any value; outside this range cash evolves in
    /// economically meaningless ways.
    pub fn rates_in_range(&self) -> bool {
        let valid = |r: f64| (0.0..1.0).contains(&r);
        valid(self.commission_rate) && valid(self.borrow_rate)
    }
}

/// Position change caused by one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeEvent {
    Opened {
        side: Position,
        spread: f64,
        commission: f64,
    },
    Closed {
        side: Position,
        entry_spread: f64,
        exit_spread: f64,
        pnl: f64,
        commission: f64,
    },
}

/// Result of processing one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Portfolio after the bar
    pub state: PortfolioState,
    /// Entry or exit that happened on this bar
    pub event: Option<TradeEvent>,
    /// Borrow fee charged on this bar
    pub borrow_fee: f64,
}

/// Output of a full simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Cash after every bar
    pub portfolio_values: Vec<f64>,
    /// Completed round trips
    pub trades: Vec<TradeRecord>,
    /// Portfolio after the last bar; may still hold a position
    pub final_state: PortfolioState,
    /// Commission paid across all entries and exits
    pub total_commission: f64,
    /// Borrow fees paid while short
    pub total_borrow_fees: f64,
}

impl BacktestResult {
    /// Check every portfolio value is finite.
    pub fn all_finite(&self) -> bool {
        self.portfolio_values.iter().all(|v| v.is_finite())
    }
}

/// Backtesting engine.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Flat portfolio holding the initial cash.
    pub fn initial_state(&self) -> PortfolioState {
        PortfolioState::new(self.config.initial_cash)
    }

    /// Apply one bar to `state`.
    ///
    /// While flat, a long signal takes priority over a simultaneous short
    /// signal. While a position is open only the exit signal is considered,
    /// and a position closed on this bar is not reopened until the next one.
    pub fn step(&self, state: PortfolioState, bar: &SignalBar) -> StepOutcome {
        let mut state = state;
        let mut event = None;

        match state.position() {
            Position::Flat => {
                let side = if bar.long_signal {
                    Some(Position::Long)
                } else if bar.short_signal {
                    Some(Position::Short)
                } else {
                    None
                };

                if let Some(side) = side {
                    state.open(side, bar.spread);
                    let commission = state.charge_proportional(self.config.commission_rate);
                    event = Some(TradeEvent::Opened {
                        side,
                        spread: bar.spread,
                        commission,
                    });
                }
            }
            Position::Long | Position::Short => {
                if bar.exit_signal {
                    if let Some((side, entry_spread)) = state.close() {
                        let pnl = side.sign() * (entry_spread - bar.spread);
                        state.realize(pnl);
                        let commission = state.charge_proportional(self.config.commission_rate);
                        event = Some(TradeEvent::Closed {
                            side,
                            entry_spread,
                            exit_spread: bar.spread,
                            pnl,
                            commission,
                        });
                    }
                }
            }
        }

        let mut borrow_fee = 0.0;
        if state.position() == Position::Short {
            borrow_fee = self.config.borrow_rate * state.cash() / TRADING_DAYS_PER_YEAR;
            state.deduct(borrow_fee);
        }

        StepOutcome {
            state,
            event,
            borrow_fee,
        }
    }

    /// Portfolio value after every bar.
    pub fn run(&self, bars: &[SignalBar]) -> Vec<f64> {
        bars.iter()
            .scan(self.initial_state(), |state, bar| {
                *state = self.step(*state, bar).state;
                Some(state.cash())
            })
            .collect()
    }

    /// Run the backtest, recording trades and fees alongside the values.
    pub fn simulate(&self, bars: &[SignalBar]) -> BacktestResult {
        let mut state = self.initial_state();
        let mut portfolio_values = Vec::with_capacity(bars.len());
        let mut trades = Vec::new();
        let mut total_commission = 0.0;
        let mut total_borrow_fees = 0.0;
        // (entry bar, entry commission) of the open position
        let mut open_entry: Option<(usize, f64)> = None;

        for (index, bar) in bars.iter().enumerate() {
            let outcome = self.step(state, bar);
            state = outcome.state;
            total_borrow_fees += outcome.borrow_fee;

            match outcome.event {
                Some(TradeEvent::Opened {
                    side,
                    spread,
                    commission,
                }) => {
                    debug!(bar = index, %side, spread, "Opened spread position");
                    total_commission += commission;
                    open_entry = Some((index, commission));
                }
                Some(TradeEvent::Closed {
                    side,
                    entry_spread,
                    exit_spread,
                    pnl,
                    commission,
                }) => {
                    debug!(bar = index, %side, entry_spread, exit_spread, pnl, "Closed spread position");
                    total_commission += commission;
                    let (entry_index, entry_commission) = open_entry.take().unwrap_or((index, 0.0));
                    trades.push(TradeRecord {
                        side,
                        entry_index,
                        exit_index: index,
                        entry_spread,
                        exit_spread,
                        pnl,
                        commission: entry_commission + commission,
                    });
                }
                None => {}
            }

            portfolio_values.push(state.cash());
        }

        info!(
            bars = bars.len(),
            trades = trades.len(),
            final_cash = state.cash(),
            open_position = %state.position(),
            "Backtest complete"
        );

        BacktestResult {
            portfolio_values,
            trades,
            final_state: state,
            total_commission,
            total_borrow_fees,
        }
    }
}

impl Default for BacktestEngine {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(initial_cash: f64, commission_rate: f64, borrow_rate: f64) -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            initial_cash,
            commission_rate,
            borrow_rate,
        })
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-9 * expected.abs().max(1.0),
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_no_signals_keeps_initial_cash() {
        let engine = BacktestEngine::default();
        let bars: Vec<SignalBar> = (0..50).map(|i| SignalBar::quiet(i as f64)).collect();

        let values = engine.run(&bars);
        assert_eq!(values.len(), 50);
        assert!(values.iter().all(|&v| v == 1_000_000.0));
    }

    #[test]
    fn test_empty_bars() {
        let engine = BacktestEngine::default();
        assert!(engine.run(&[]).is_empty());

        let result = engine.simulate(&[]);
        assert!(result.portfolio_values.is_empty());
        assert!(result.trades.is_empty());
        assert_eq!(result.final_state, engine.initial_state());
    }

    #[test]
    fn test_commission_only_round_trip() {
        let engine = engine(1_000_000.0, 0.00125, 0.0);
        let bars = [SignalBar::long(100.0), SignalBar::exit(100.0)];

        let values = engine.run(&bars);
        assert_close(values[0], 1_000_000.0 * (1.0 - 0.00125));
        assert_close(values[1], 1_000_000.0 * (1.0 - 0.00125_f64).powi(2));
    }

    #[test]
    fn test_short_borrow_drag() {
        let borrow_rate = 0.05;
        let engine = engine(1_000_000.0, 0.0, borrow_rate);
        let n = 30;
        let mut bars = vec![SignalBar::short(50.0)];
        bars.extend((1..n).map(|_| SignalBar::quiet(50.0)));

        let values = engine.run(&bars);
        assert_eq!(values.len(), n);
        assert_close(
            values[n - 1],
            1_000_000.0 * (1.0 - borrow_rate / 252.0).powi(n as i32),
        );
    }

    #[test]
    fn test_long_and_short_pnl_signs() {
        let engine = engine(1000.0, 0.0, 0.0);

        // Long realizes entry - exit
        let values = engine.run(&[SignalBar::long(100.0), SignalBar::exit(90.0)]);
        assert_close(values[1], 1010.0);

        // Short realizes -(entry - exit)
        let values = engine.run(&[SignalBar::short(100.0), SignalBar::exit(90.0)]);
        assert_close(values[1], 990.0);
    }

    #[test]
    fn test_simultaneous_long_and_short_opens_long() {
        let engine = BacktestEngine::default();
        let bar = SignalBar {
            spread: 5.0,
            long_signal: true,
            short_signal: true,
            exit_signal: false,
        };

        let outcome = engine.step(engine.initial_state(), &bar);
        assert_eq!(outcome.state.position(), Position::Long);
        assert_eq!(outcome.state.entry_spread(), Some(5.0));
        assert_eq!(outcome.borrow_fee, 0.0);
    }

    #[test]
    fn test_exit_while_flat_is_noop() {
        let engine = BacktestEngine::default();
        let outcome = engine.step(engine.initial_state(), &SignalBar::exit(1.0));

        assert_eq!(outcome.state, engine.initial_state());
        assert!(outcome.event.is_none());
    }

    #[test]
    fn test_entry_signals_ignored_while_open() {
        let engine = engine(1000.0, 0.01, 0.0);
        let mut state = engine.step(engine.initial_state(), &SignalBar::long(10.0)).state;
        let cash_after_entry = state.cash();

        for bar in [SignalBar::long(11.0), SignalBar::short(12.0)] {
            let outcome = engine.step(state, &bar);
            assert!(outcome.event.is_none());
            state = outcome.state;
        }
        assert_eq!(state.position(), Position::Long);
        assert_eq!(state.entry_spread(), Some(10.0));
        assert_eq!(state.cash(), cash_after_entry);
    }

    #[test]
    fn test_no_same_bar_reentry_after_exit() {
        let engine = BacktestEngine::default();
        let state = engine.step(engine.initial_state(), &SignalBar::short(3.0)).state;

        let bar = SignalBar {
            spread: 1.0,
            long_signal: true,
            short_signal: false,
            exit_signal: true,
        };
        let outcome = engine.step(state, &bar);
        assert_eq!(outcome.state.position(), Position::Flat);
        assert!(matches!(outcome.event, Some(TradeEvent::Closed { .. })));
    }

    #[test]
    fn test_entry_and_exit_on_same_flat_bar_only_enters() {
        let engine = BacktestEngine::default();
        let bar = SignalBar {
            spread: 1.0,
            long_signal: true,
            short_signal: false,
            exit_signal: true,
        };
        let outcome = engine.step(engine.initial_state(), &bar);
        assert_eq!(outcome.state.position(), Position::Long);
    }

    #[test]
    fn test_borrow_fee_on_entry_bar_but_not_exit_bar() {
        let engine = engine(252_000.0, 0.0, 0.1);

        let opened = engine.step(engine.initial_state(), &SignalBar::short(2.0));
        assert_close(opened.borrow_fee, 100.0);

        let closed = engine.step(opened.state, &SignalBar::exit(2.0));
        assert_eq!(closed.borrow_fee, 0.0);
        assert_close(closed.state.cash(), 251_900.0);
    }

    #[test]
    fn test_replay_is_bit_identical() {
        let engine = BacktestEngine::default();
        let bars: Vec<SignalBar> = (0..200)
            .map(|i| {
                let s = (i as f64 * 0.21).sin() * 3.0;
                SignalBar {
                    spread: s,
                    long_signal: s < -2.0,
                    short_signal: s > 2.0,
                    exit_signal: s.abs() < 0.5,
                }
            })
            .collect();

        let first = engine.run(&bars);
        let second = engine.run(&bars);
        assert_eq!(
            first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
        assert_eq!(engine.simulate(&bars).portfolio_values, first);
    }

    #[test]
    fn test_simulate_records_trades_and_fees() {
        let engine = engine(10_000.0, 0.001, 0.0252);
        let bars = [
            SignalBar::short(5.0),
            SignalBar::quiet(4.0),
            SignalBar::exit(3.0),
            SignalBar::long(-1.0),
        ];

        let result = engine.simulate(&bars);
        assert_eq!(result.trades.len(), 1);

        let trade = &result.trades[0];
        assert_eq!(trade.side, Position::Short);
        assert_eq!((trade.entry_index, trade.exit_index), (0, 2));
        assert_close(trade.pnl, -2.0);
        assert!(trade.commission > 0.0);

        // Two short bars pay borrow, the long one does not
        assert!(result.total_borrow_fees > 0.0);
        assert_eq!(result.final_state.position(), Position::Long);
        assert!(result.all_finite());
    }

    #[test]
    fn test_rates_in_range() {
        assert!(BacktestConfig::default().rates_in_range());
        let config = BacktestConfig {
            commission_rate: 1.5,
            ..Default::default()
        };
        assert!(!config.rates_in_range());
    }
}
