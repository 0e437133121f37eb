//! Trailing window statistics of a spread.

use pairs_core::error::IndicatorError;
use pairs_core::traits::Indicator;
use statrs::statistics::Statistics;

/// Mean and population standard deviation of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Rolling mean and population standard deviation.
#[derive(Debug, Clone)]
pub struct RollingStats {
    window: usize,
}

impl RollingStats {
    /// Create rolling statistics over `window` values (at least 2).
    pub fn new(window: usize) -> Result<Self, IndicatorError> {
        if window < 2 {
            return Err(IndicatorError::InvalidParameter(format!(
                "window must be at least 2, got {}",
                window
            )));
        }
        Ok(Self { window })
    }
}

impl Indicator for RollingStats {
    type Output = WindowStats;

    fn calculate(&self, data: &[f64]) -> Vec<WindowStats> {
        data.windows(self.window)
            .map(|w| WindowStats {
                mean: w.iter().mean(),
                std_dev: w.iter().population_std_dev(),
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.window
    }

    fn name(&self) -> &str {
        "RollingStats"
    }
}
