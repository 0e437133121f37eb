//! Price data loading and results output.

mod csv_source;
mod pairs;
mod writer;

pub use csv_source::{parse_timestamp, read_prices, ColumnSpec, CsvPriceSource};
pub use pairs::join_pairs;
pub use writer::{write_results, write_rows};

use pairs_core::error::DataError;
use pairs_core::traits::PriceSource;
use pairs_core::types::PairSeries;

/// Load both legs concurrently and join them on date.
pub async fn load_pair(
    source: &dyn PriceSource,
    ticker_a: &str,
    ticker_b: &str,
) -> Result<PairSeries, DataError> {
    let (prices_a, prices_b) = tokio::try_join!(source.load_prices(ticker_a), source.load_prices(ticker_b))?;
    join_pairs(ticker_a, &prices_a, ticker_b, &prices_b)
}
