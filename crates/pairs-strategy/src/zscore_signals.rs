//! Z-score threshold signals.
//!
//! Long when the spread is stretched below its mean (`z < -entry_z`), short
//! when stretched above (`z > entry_z`), exit once it reverts
//! (`|z| < exit_z`). The flags are stateless per bar; the backtest engine
//! decides which of them apply given the open position.

use pairs_core::{
    error::StrategyError,
    traits::StrategyConfig,
    types::SignalBar,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the z-score signal generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Absolute z-score beyond which a position is entered
    pub entry_z: f64,
    /// Absolute z-score below which an open position is exited
    pub exit_z: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            entry_z: 2.0,
            exit_z: 0.5,
        }
    }
}

impl StrategyConfig for SignalConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !self.entry_z.is_finite() || self.entry_z <= 0.0 {
            return Err(StrategyError::InvalidConfig(format!(
                "entry_z must be positive, got {}",
                self.entry_z
            )));
        }
        if !self.exit_z.is_finite() || self.exit_z < 0.0 {
            return Err(StrategyError::InvalidConfig(format!(
                "exit_z must be non-negative, got {}",
                self.exit_z
            )));
        }
        if self.exit_z >= self.entry_z {
            return Err(StrategyError::InvalidConfig(format!(
                "exit_z ({}) must be below entry_z ({})",
                self.exit_z, self.entry_z
            )));
        }
        Ok(())
    }
}

/// Generates [`SignalBar`]s from a spread and its z-score.
#[derive(Debug, Clone)]
pub struct ZScoreSignalGenerator {
    config: SignalConfig,
}

impl ZScoreSignalGenerator {
    /// Create a generator from a validated configuration.
    pub fn new(config: SignalConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Signals for one bar. A NaN z-score sets no flag.
    pub fn signal(&self, spread: f64, z: f64) -> SignalBar {
        SignalBar {
            spread,
            long_signal: z < -self.config.entry_z,
            short_signal: z > self.config.entry_z,
            exit_signal: z.abs() < self.config.exit_z,
        }
    }

    /// Signals for a whole series.
    pub fn generate(&self, spreads: &[f64], zscores: &[f64]) -> Result<Vec<SignalBar>, StrategyError> {
        if spreads.len() != zscores.len() {
            return Err(StrategyError::LengthMismatch {
                spreads: spreads.len(),
                zscores: zscores.len(),
            });
        }

        let bars: Vec<SignalBar> = spreads
            .iter()
            .zip(zscores)
            .map(|(&s, &z)| self.signal(s, z))
            .collect();

        debug!(
            bars = bars.len(),
            longs = bars.iter().filter(|b| b.long_signal).count(),
            shorts = bars.iter().filter(|b| b.short_signal).count(),
            exits = bars.iter().filter(|b| b.exit_signal).count(),
            "Trading signals generated"
        );
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> ZScoreSignalGenerator {
        ZScoreSignalGenerator::new(SignalConfig::default()).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(SignalConfig::default().validate().is_ok());

        let config = SignalConfig {
            entry_z: 0.0,
            exit_z: 0.0,
        };
        assert!(config.validate().is_err());

        let config = SignalConfig {
            entry_z: 1.0,
            exit_z: 1.5,
        };
        assert!(config.validate().is_err());

        let config = SignalConfig {
            entry_z: f64::INFINITY,
            exit_z: 0.5,
        };
        assert!(ZScoreSignalGenerator::new(config).is_err());
    }

    #[test]
    fn test_threshold_signals() {
        let gen = generator();

        let bar = gen.signal(-3.0, -2.5);
        assert!(bar.long_signal && !bar.short_signal && !bar.exit_signal);

        let bar = gen.signal(3.0, 2.5);
        assert!(!bar.long_signal && bar.short_signal && !bar.exit_signal);

        let bar = gen.signal(0.1, 0.2);
        assert!(!bar.long_signal && !bar.short_signal && bar.exit_signal);

        // Boundaries are strict
        let bar = gen.signal(0.0, 2.0);
        assert!(!bar.has_signal());
        let bar = gen.signal(0.0, -0.5);
        assert!(!bar.has_signal());
    }

    #[test]
    fn test_nan_zscore_sets_nothing() {
        let bar = generator().signal(1.0, f64::NAN);
        assert!(!bar.has_signal());
        assert_eq!(bar.spread, 1.0);
    }

    #[test]
    fn test_generate_series() {
        let gen = generator();
        let bars = gen
            .generate(&[1.0, 2.0, 3.0], &[-2.1, 0.0, 2.1])
            .unwrap();

        assert_eq!(bars.len(), 3);
        assert!(bars[0].long_signal);
        assert!(bars[1].exit_signal);
        assert!(bars[2].short_signal);
        assert_eq!(bars[2].spread, 3.0);

        assert!(gen.generate(&[1.0], &[]).is_err());
    }
}
