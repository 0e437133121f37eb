//! Configuration management.

mod settings;

pub use settings::{AppConfig, AppSettings, DataSettings, LoggingConfig, PairSettings, ReportSettings};

use config::{Config, ConfigError, Environment, File};
use pairs_core::traits::StrategyConfig;
use pairs_indicators::{HedgeRatioEstimator, ZScoreMethod};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load configuration from file and environment.
///
/// Variables such as `PAIRS__BACKTEST__BORROW_RATE=0.01` override the file.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("PAIRS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Load configuration, falling back to built-in defaults only when `path` is
/// [`DEFAULT_CONFIG_PATH`] and that file does not exist.
///
/// Any other missing path is a [`SettingsError::Load`].
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, SettingsError> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Ok(AppConfig::default());
    }
    load_config(path)
}

/// Check the configuration, returning non-fatal warnings.
pub fn validate_config(config: &AppConfig) -> Result<Vec<String>, SettingsError> {
    HedgeRatioEstimator::new(config.kalman).map_err(|e| SettingsError::Invalid(e.to_string()))?;
    config
        .signals
        .validate()
        .map_err(|e| SettingsError::Invalid(e.to_string()))?;

    if let ZScoreMethod::Rolling { window } = config.zscore {
        if window < 2 {
            return Err(SettingsError::Invalid(format!(
                "zscore window must be at least 2, got {}",
                window
            )));
        }
    }
    if config.report.rolling_window < 2 {
        return Err(SettingsError::Invalid(format!(
            "report.rolling_window must be at least 2, got {}",
            config.report.rolling_window
        )));
    }
    if !config.backtest.initial_cash.is_finite() || config.backtest.initial_cash <= 0.0 {
        return Err(SettingsError::Invalid(format!(
            "backtest.initial_cash must be positive, got {}",
            config.backtest.initial_cash
        )));
    }

    for pair in &config.pairs {
        if pair.ticker_a.is_empty() || pair.ticker_b.is_empty() {
            return Err(SettingsError::Invalid("pair with empty ticker".to_string()));
        }
        if pair.ticker_a == pair.ticker_b {
            return Err(SettingsError::Invalid(format!(
                "pair {} uses the same ticker twice",
                pair.label()
            )));
        }
    }

    let mut warnings = Vec::new();
    if !config.backtest.rates_in_range() {
        warnings.push(format!(
            "commission_rate {} or borrow_rate {} outside [0, 1)",
            config.backtest.commission_rate, config.backtest.borrow_rate
        ));
    }
    if config.zscore == ZScoreMethod::FullSample {
        warnings.push("full-sample z-score uses future data; prefer method = \"rolling\"".to_string());
    }
    if config.pairs.is_empty() {
        warnings.push("no pairs configured".to_string());
    }
    Ok(warnings)
}

/// Render the configuration as TOML.
pub fn render_config(config: &AppConfig) -> Result<String, SettingsError> {
    Ok(toml::to_string_pretty(config)?)
}
