//! Core types and traits for the pairs trading system.
//!
//! This crate provides the foundational building blocks including:
//! - Price observations for a pair of assets (PricePair, PairSeries)
//! - Per-bar trading signals (SignalBar)
//! - Position and portfolio state for the spread backtest
//! - Core traits for indicators, strategy configuration and price sources

pub mod error;
pub mod traits;
pub mod types;

pub use error::{PairsError, PairsResult};
pub use traits::*;
pub use types::*;

/// Trading days per year used to annualize rates and ratios.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
