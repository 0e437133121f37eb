//! Windowed series transforms.

use crate::error::IndicatorError;

/// A transform that emits one value per full trailing window of a series.
///
/// `calculate` returns `data.len() - period() + 1` values (none when the
/// series is shorter than a window); value `i` covers `data[i..i + period()]`.
pub trait Indicator: Send + Sync {
    type Output;

    /// One output per full window.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Window length.
    fn period(&self) -> usize;

    fn name(&self) -> &str;

    /// Error unless `data` holds at least one full window.
    fn validate_data(&self, data: &[f64]) -> Result<(), IndicatorError> {
        if data.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: data.len(),
            });
        }
        Ok(())
    }
}
