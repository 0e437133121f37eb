//! Price observation types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single closing price for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Closing price
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Synchronized prices of both legs at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Price of the dependent leg (A)
    pub price_a: f64,
    /// Price of the hedge leg (B)
    pub price_b: f64,
}

impl PricePair {
    /// Create a new price pair.
    pub fn new(timestamp: i64, price_a: f64, price_b: f64) -> Self {
        Self {
            timestamp,
            price_a,
            price_b,
        }
    }

    /// Price ratio `A / (B + epsilon)`.
    ///
    /// `epsilon` only guards against division by a near-zero price.
    #[inline]
    pub fn ratio(&self, epsilon: f64) -> f64 {
        self.price_a / (self.price_b + epsilon)
    }

    /// Spread of A against B for the given hedge ratio.
    #[inline]
    pub fn spread(&self, hedge_ratio: f64) -> f64 {
        self.price_a - hedge_ratio * self.price_b
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }
}

/// Time-ordered, date-aligned price series for an asset pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairSeries {
    /// Ticker of leg A
    pub ticker_a: String,
    /// Ticker of leg B
    pub ticker_b: String,
    pairs: Vec<PricePair>,
}

impl PairSeries {
    /// Create a series from already sorted, deduplicated observations.
    pub fn new(
        ticker_a: impl Into<String>,
        ticker_b: impl Into<String>,
        pairs: Vec<PricePair>,
    ) -> Self {
        Self {
            ticker_a: ticker_a.into(),
            ticker_b: ticker_b.into(),
            pairs,
        }
    }

    /// Label such as `V/AXP`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.ticker_a, self.ticker_b)
    }

    /// Get the number of observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Get all observations.
    pub fn pairs(&self) -> &[PricePair] {
        &self.pairs
    }

    /// Extract leg A prices.
    pub fn prices_a(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.price_a).collect()
    }

    /// Extract leg B prices.
    pub fn prices_b(&self) -> Vec<f64> {
        self.pairs.iter().map(|p| p.price_b).collect()
    }

    /// Extract timestamps.
    pub fn timestamps(&self) -> Vec<i64> {
        self.pairs.iter().map(|p| p.timestamp).collect()
    }

    /// Check the ordering invariant (strictly increasing timestamps).
    pub fn is_strictly_ordered(&self) -> bool {
        self.pairs.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
    }

    /// Get an iterator over the observations.
    pub fn iter(&self) -> impl Iterator<Item = &PricePair> {
        self.pairs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_and_spread() {
        let pair = PricePair::new(0, 250.0, 125.0);
        assert!((pair.ratio(0.0) - 2.0).abs() < 1e-12);
        assert!((pair.spread(2.0)).abs() < 1e-12);
        assert!((pair.spread(1.5) - 62.5).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_epsilon_guards_zero_price() {
        let pair = PricePair::new(0, 1.0, 0.0);
        assert!(pair.ratio(1e-8).is_finite());
    }

    #[test]
    fn test_series_ordering() {
        let series = PairSeries::new(
            "V",
            "AXP",
            vec![PricePair::new(1, 1.0, 1.0), PricePair::new(2, 1.0, 1.0)],
        );
        assert!(series.is_strictly_ordered());
        assert_eq!(series.label(), "V/AXP");
        assert_eq!(series.timestamps(), vec![1, 2]);

        let unordered = PairSeries::new(
            "V",
            "AXP",
            vec![PricePair::new(2, 1.0, 1.0), PricePair::new(2, 1.0, 1.0)],
        );
        assert!(!unordered.is_strictly_ordered());
    }
}
