//! Spread position and portfolio state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the single open spread position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Flat,
    Long,
    Short,
}

impl Position {
    /// Sign applied to `entry_spread - current_spread` when realizing P&L.
    #[inline]
    pub fn sign(&self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
            Position::Short => -1.0,
        }
    }

    /// Check if no position is open.
    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::Flat => "flat",
            Position::Long => "long",
            Position::Short => "short",
        };
        write!(f, "{}", s)
    }
}

/// Cash and open position carried from one bar to the next.
///
/// `entry_spread` is `Some` exactly when the position is not flat; the fields
/// are private so the only way to change the position is [`open`] / [`close`].
///
/// [`open`]: PortfolioState::open
/// [`close`]: PortfolioState::close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    cash: f64,
    position: Position,
    entry_spread: Option<f64>,
}

impl PortfolioState {
    /// Create a flat portfolio holding `cash`.
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            position: Position::Flat,
            entry_spread: None,
        }
    }

    #[inline]
    pub fn cash(&self) -> f64 {
        self.cash
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn entry_spread(&self) -> Option<f64> {
        self.entry_spread
    }

    /// Deduct `rate * cash` and return the amount charged.
    pub fn charge_proportional(&mut self, rate: f64) -> f64 {
        let fee = rate * self.cash;
        self.deduct(fee);
        fee
    }

    /// Deduct a fixed amount from cash.
    pub fn deduct(&mut self, amount: f64) {
        self.cash -= amount;
    }

    /// Add realized profit (or loss) to cash.
    pub fn realize(&mut self, pnl: f64) {
        self.cash += pnl;
    }

    /// Open `side` at `spread`. Returns `false` (and changes nothing) when a
    /// position is already open or `side` is flat.
    pub fn open(&mut self, side: Position, spread: f64) -> bool {
        if !self.position.is_flat() || side.is_flat() {
            return false;
        }
        self.position = side;
        self.entry_spread = Some(spread);
        true
    }

    /// Close the open position, returning its side and entry spread.
    pub fn close(&mut self) -> Option<(Position, f64)> {
        let entry = self.entry_spread.take()?;
        let side = std::mem::take(&mut self.position);
        Some((side, entry))
    }
}
