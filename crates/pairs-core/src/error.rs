//! Error types for the pairs trading system.

use thiserror::Error;

/// Top-level pairs trading error.
#[derive(Error, Debug)]
pub enum PairsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Kalman filter errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter parameter: {0}")]
    InvalidParameter(String),

    /// `H * P_pred * H + R` evaluated to zero (or a non-finite value).
    #[error("Degenerate gain: innovation variance is {denominator}")]
    DegenerateGain { denominator: f64 },

    #[error("Length mismatch: {left} observations for leg A, {right} for leg B")]
    LengthMismatch { left: usize, right: usize },
}

/// Signal generation errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Length mismatch: {spreads} spreads, {zscores} z-scores")]
    LengthMismatch { spreads: usize, zscores: usize },
}

/// Data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("Duplicate timestamp {timestamp} in {source_name}")]
    DuplicateTimestamp { timestamp: i64, source_name: String },

    #[error("Invalid price {price} at timestamp {timestamp} in {source_name}")]
    InvalidPrice {
        price: f64,
        timestamp: i64,
        source_name: String,
    },

    #[error("Timestamps of {source_name} are not strictly increasing")]
    Unordered { source_name: String },

    #[error("No overlapping dates between {ticker_a} and {ticker_b}")]
    NoOverlap { ticker_a: String, ticker_b: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),
}

/// Result type alias for pairs trading operations.
pub type PairsResult<T> = Result<T, PairsError>;
