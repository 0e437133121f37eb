//! Strategy configuration trait.

use crate::error::StrategyError;

/// Configuration trait for signal generators.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}
