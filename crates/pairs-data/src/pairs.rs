//! Date alignment of two price series.

use pairs_core::error::DataError;
use pairs_core::types::{PairSeries, PricePair, PricePoint};
use std::collections::BTreeMap;
use tracing::debug;

/// Error on the first timestamp that appears twice in `points`.
fn ensure_unique(points: &[PricePoint], source_name: &str) -> Result<(), DataError> {
    let mut timestamps: Vec<i64> = points.iter().map(|p| p.timestamp).collect();
    timestamps.sort_unstable();
    match timestamps.windows(2).find(|w| w[0] == w[1]) {
        Some(w) => Err(DataError::DuplicateTimestamp {
            timestamp: w[0],
            source_name: source_name.to_string(),
        }),
        None => Ok(()),
    }
}

/// Inner-join two price series on timestamp.
///
/// The result is ordered by timestamp. Dates present in only one leg are
/// dropped; an empty intersection or a repeated date in either leg is an
/// error.
pub fn join_pairs(
    ticker_a: &str,
    prices_a: &[PricePoint],
    ticker_b: &str,
    prices_b: &[PricePoint],
) -> Result<PairSeries, DataError> {
    ensure_unique(prices_a, ticker_a)?;
    ensure_unique(prices_b, ticker_b)?;

    let by_time: BTreeMap<i64, f64> = prices_b.iter().map(|p| (p.timestamp, p.price)).collect();

    let mut pairs: Vec<PricePair> = prices_a
        .iter()
        .filter_map(|a| {
            by_time
                .get(&a.timestamp)
                .map(|&price_b| PricePair::new(a.timestamp, a.price, price_b))
        })
        .collect();
    pairs.sort_by_key(|p| p.timestamp);

    if pairs.is_empty() {
        return Err(DataError::NoOverlap {
            ticker_a: ticker_a.to_string(),
            ticker_b: ticker_b.to_string(),
        });
    }

    debug!(
        ticker_a,
        ticker_b,
        rows_a = prices_a.len(),
        rows_b = prices_b.len(),
        joined = pairs.len(),
        "Joined price series"
    );

    Ok(PairSeries::new(ticker_a, ticker_b, pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(data: &[(i64, f64)]) -> Vec<PricePoint> {
        data.iter().map(|&(t, p)| PricePoint::new(t, p)).collect()
    }

    #[test]
    fn test_inner_join() {
        let a = points(&[(1, 10.0), (2, 11.0), (4, 12.0)]);
        let b = points(&[(2, 5.0), (3, 6.0), (4, 7.0)]);

        let series = join_pairs("V", &a, "AXP", &b).unwrap();
        assert_eq!(series.label(), "V/AXP");
        assert_eq!(series.timestamps(), vec![2, 4]);
        assert_eq!(series.prices_a(), vec![11.0, 12.0]);
        assert_eq!(series.prices_b(), vec![5.0, 7.0]);
        assert!(series.is_strictly_ordered());
    }

    #[test]
    fn test_join_orders_unsorted_input() {
        let a = points(&[(3, 1.0), (1, 2.0)]);
        let b = points(&[(1, 3.0), (3, 4.0)]);
        let series = join_pairs("A", &a, "B", &b).unwrap();
        assert_eq!(series.timestamps(), vec![1, 3]);
    }

    #[test]
    fn test_no_overlap() {
        let a = points(&[(1, 10.0)]);
        let b = points(&[(2, 5.0)]);
        assert!(matches!(
            join_pairs("A", &a, "B", &b),
            Err(DataError::NoOverlap { .. })
        ));
        assert!(join_pairs("A", &[], "B", &b).is_err());
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let a = points(&[(1, 10.0), (2, 11.0), (1, 12.0)]);
        let b = points(&[(1, 5.0), (2, 6.0)]);
        assert!(matches!(
            join_pairs("A", &a, "B", &b),
            Err(DataError::DuplicateTimestamp { timestamp: 1, ref source_name }) if source_name == "A"
        ));

        let a = points(&[(1, 10.0), (2, 11.0)]);
        let b = points(&[(2, 5.0), (2, 6.0)]);
        assert!(matches!(
            join_pairs("A", &a, "B", &b),
            Err(DataError::DuplicateTimestamp { timestamp: 2, ref source_name }) if source_name == "B"
        ));
    }
}
