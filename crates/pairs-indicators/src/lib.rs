//! Indicators for pairs trading.
//!
//! This crate provides:
//! - A scalar Kalman filter and the hedge ratio estimator built on it
//! - Spread and z-score derivation (full-sample or rolling)
//! - Trailing window statistics used by the rolling z-score
//!
//! The element-wise spread and ratio kernels have SIMD implementations in
//! [`simd`] for long backtests.

pub mod kalman;
pub mod rolling;
pub mod simd;
pub mod zscore;

pub use kalman::{
    FilterParameters, FilterState, HedgeRatioConfig, HedgeRatioEstimator, KalmanFilter,
    KalmanUpdate,
};
pub use rolling::{RollingStats, WindowStats};
pub use zscore::{compute_spread, zscore_series, ZScore, ZScoreMethod};
