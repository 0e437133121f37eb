//! Signal generation for pairs trading.
//!
//! Turns a standardized spread into per-bar long / short / exit flags
//! consumed by the backtest engine.

mod zscore_signals;

pub use zscore_signals::{SignalConfig, ZScoreSignalGenerator};
