//! Price source trait definitions.

use crate::error::DataError;
use crate::types::PricePoint;
use async_trait::async_trait;

/// Trait for historical single-asset price sources.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Load every closing price for `ticker`.
    ///
    /// # Returns
    /// Price points ordered from oldest to newest, one per timestamp
    async fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
