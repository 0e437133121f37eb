//! Configuration structures.

use pairs_backtest::{BacktestConfig, PipelineConfig};
use pairs_indicators::{HedgeRatioConfig, ZScoreMethod};
use pairs_strategy::SignalConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub kalman: HedgeRatioConfig,
    #[serde(default)]
    pub zscore: ZScoreMethod,
    #[serde(default)]
    pub signals: SignalConfig,
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub pairs: Vec<PairSettings>,
}

impl AppConfig {
    /// Pipeline configuration shared by every pair.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            hedge: self.kalman,
            zscore: self.zscore,
            signals: self.signals,
            backtest: self.backtest,
            rolling_window: self.report.rolling_window,
        }
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "pairs".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional log file, written alongside stdout
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Where price files live and how they are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory holding `<TICKER>.csv`
    pub dir: PathBuf,
    pub date_column: String,
    pub price_column: String,
    /// Directory results files are written to; must already exist
    pub output_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            date_column: "Date".to_string(),
            price_column: "Close".to_string(),
            output_dir: PathBuf::from("data"),
        }
    }
}

/// Report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Window of the rolling Sharpe column
    pub rolling_window: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { rolling_window: 60 }
    }
}

/// One asset pair to backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSettings {
    pub ticker_a: String,
    pub ticker_b: String,
    /// Overrides `<data.dir>/<ticker_a>.csv`
    #[serde(default)]
    pub file_a: Option<PathBuf>,
    /// Overrides `<data.dir>/<ticker_b>.csv`
    #[serde(default)]
    pub file_b: Option<PathBuf>,
}

impl PairSettings {
    pub fn new(ticker_a: impl Into<String>, ticker_b: impl Into<String>) -> Self {
        Self {
            ticker_a: ticker_a.into(),
            ticker_b: ticker_b.into(),
            file_a: None,
            file_b: None,
        }
    }

    /// Label used in logs and file names, e.g. `V/AXP`.
    pub fn label(&self) -> String {
        format!("{}/{}", self.ticker_a, self.ticker_b)
    }

    /// Default results file name, e.g. `results_V_AXP.csv`.
    pub fn results_file_name(&self) -> String {
        format!("results_{}_{}.csv", self.ticker_a, self.ticker_b)
    }
}
