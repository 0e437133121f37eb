//! Per-bar trading signals.

use serde::{Deserialize, Serialize};

/// One bar of input to the backtest: the spread and its three signals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalBar {
    /// Spread value at this bar
    pub spread: f64,
    /// Enter a long spread position
    pub long_signal: bool,
    /// Enter a short spread position
    pub short_signal: bool,
    /// Exit the open position
    pub exit_signal: bool,
}

impl SignalBar {
    /// Bar with no signals set.
    pub fn quiet(spread: f64) -> Self {
        Self {
            spread,
            ..Default::default()
        }
    }

    pub fn long(spread: f64) -> Self {
        Self {
            spread,
            long_signal: true,
            ..Default::default()
        }
    }

    pub fn short(spread: f64) -> Self {
        Self {
            spread,
            short_signal: true,
            ..Default::default()
        }
    }

    pub fn exit(spread: f64) -> Self {
        Self {
            spread,
            exit_signal: true,
            ..Default::default()
        }
    }

    /// Check if any signal is set.
    pub fn has_signal(&self) -> bool {
        self.long_signal || self.short_signal || self.exit_signal
    }
}
