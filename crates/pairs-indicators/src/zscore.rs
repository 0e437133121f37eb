//! Spread and z-score derivation.

use pairs_core::error::IndicatorError;
use pairs_core::traits::Indicator;
use pairs_core::types::PricePair;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::rolling::RollingStats;
use crate::simd::spread_simd;

/// Spread `A - hedge * B` at every observation.
pub fn compute_spread(pairs: &[PricePair], hedge_ratios: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    if pairs.len() != hedge_ratios.len() {
        return Err(IndicatorError::LengthMismatch(format!(
            "{} observations, {} hedge ratios",
            pairs.len(),
            hedge_ratios.len()
        )));
    }
    let a: Vec<f64> = pairs.iter().map(|p| p.price_a).collect();
    let b: Vec<f64> = pairs.iter().map(|p| p.price_b).collect();
    Ok(spread_simd(&a, &b, hedge_ratios))
}

/// How the spread is standardized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ZScoreMethod {
    /// Mean and sample standard deviation of the whole series.
    ///
    /// Every value uses statistics of the full history, including bars after
    /// it, so backtests built on it contain look-ahead.
    #[default]
    FullSample,
    /// Trailing window mean and population standard deviation.
    Rolling { window: usize },
}

/// Rolling z-score of the last value in each window.
#[derive(Debug, Clone)]
pub struct ZScore {
    stats: RollingStats,
}

impl ZScore {
    /// Create a rolling z-score over `window` values (at least 2).
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            stats: RollingStats::new(window)?,
        })
    }
}

impl Indicator for ZScore {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let window = self.period();
        self.stats
            .calculate(data)
            .iter()
            .zip(&data[data.len().min(window - 1)..])
            .map(|(stats, &value)| standardize(value, stats.mean, stats.std_dev))
            .collect()
    }

    fn period(&self) -> usize {
        self.stats.period()
    }

    fn name(&self) -> &str {
        "ZScore"
    }
}

/// Z-score of every spread value, same length as the input.
///
/// With [`ZScoreMethod::Rolling`] the first `window - 1` values are NaN.
pub fn zscore_series(spread: &[f64], method: ZScoreMethod) -> Result<Vec<f64>, IndicatorError> {
    match method {
        ZScoreMethod::FullSample => {
            if spread.is_empty() {
                return Ok(vec![]);
            }
            let mean = spread.iter().mean();
            let sd = spread.iter().std_dev();
            Ok(spread.iter().map(|&s| standardize(s, mean, sd)).collect())
        }
        ZScoreMethod::Rolling { window } => {
            let zscore = ZScore::new(window)?;
            let mut result = vec![f64::NAN; spread.len().min(window - 1)];
            result.extend(zscore.calculate(spread));
            Ok(result)
        }
    }
}

#[inline]
fn standardize(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 || !std_dev.is_finite() {
        0.0
    } else {
        (value - mean) / std_dev
    }
}
