//! Core data types for the pairs trading system.

mod observation;
mod position;
mod signal;

pub use observation::{PairSeries, PricePair, PricePoint};
pub use position::{PortfolioState, Position};
pub use signal::SignalBar;
