//! CSV price source.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use pairs_core::error::DataError;
use pairs_core::traits::PriceSource;
use pairs_core::types::PricePoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_ALIASES: [&str; 4] = ["Date", "date", "Timestamp", "timestamp"];
const PRICE_ALIASES: [&str; 5] = ["Close", "close", "adj_close", "Adj Close", "price"];

/// Names of the date and price columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    pub date: String,
    pub price: String,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            price: "Close".to_string(),
        }
    }
}

impl ColumnSpec {
    pub fn new(date: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            price: price.into(),
        }
    }
}

/// Locate `name` in the header, falling back to well-known aliases.
fn find_column(
    headers: &StringRecord,
    name: &str,
    aliases: &[&str],
    source_name: &str,
) -> Result<usize, DataError> {
    let position = |wanted: &str| headers.iter().position(|h| h.trim() == wanted);

    position(name)
        .or_else(|| aliases.iter().find_map(|alias| position(*alias)))
        .ok_or_else(|| DataError::MissingColumn {
            column: name.to_string(),
            source_name: source_name.to_string(),
        })
}

/// Parse a date, datetime or unix timestamp into milliseconds.
pub fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let date_str = date_str.trim();

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Unix timestamp, milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("Could not parse date: {}", date_str)))
}

/// Read price points from CSV text.
///
/// Rows are returned sorted by timestamp. Duplicate timestamps and prices
/// that are not finite and positive are rejected.
pub fn read_prices<R: Read>(
    reader: R,
    columns: &ColumnSpec,
    source_name: &str,
) -> Result<Vec<PricePoint>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(e.to_string()))?
        .clone();
    let date_idx = find_column(&headers, &columns.date, &DATE_ALIASES, source_name)?;
    let price_idx = find_column(&headers, &columns.price, &PRICE_ALIASES, source_name)?;

    let mut points = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| DataError::ParseError(e.to_string()))?;
        let (Some(date), Some(price)) = (record.get(date_idx), record.get(price_idx)) else {
            return Err(DataError::ParseError(format!(
                "Short row at line {} in {}",
                record.position().map(|p| p.line()).unwrap_or(0),
                source_name
            )));
        };

        let timestamp = parse_timestamp(date)?;
        let price: f64 = price
            .trim()
            .parse()
            .map_err(|_| DataError::ParseError(format!("Invalid price '{}' in {}", price, source_name)))?;

        if !price.is_finite() || price <= 0.0 {
            return Err(DataError::InvalidPrice {
                price,
                timestamp,
                source_name: source_name.to_string(),
            });
        }
        points.push(PricePoint::new(timestamp, price));
    }

    points.sort_by_key(|p| p.timestamp);

    if let Some(w) = points.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
        return Err(DataError::DuplicateTimestamp {
            timestamp: w[0].timestamp,
            source_name: source_name.to_string(),
        });
    }

    Ok(points)
}

/// CSV price source reading `<dir>/<TICKER>.csv` unless a file is registered.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
    columns: ColumnSpec,
    files: HashMap<String, PathBuf>,
}

impl CsvPriceSource {
    /// Create a new CSV source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            columns: ColumnSpec::default(),
            files: HashMap::new(),
        }
    }

    /// Use custom column names.
    pub fn with_columns(mut self, columns: ColumnSpec) -> Self {
        self.columns = columns;
        self
    }

    /// Read `ticker` from an explicit file.
    pub fn with_file(mut self, ticker: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(ticker.into(), path.into());
        self
    }

    /// Path the prices of `ticker` are read from.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.files
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| self.dir.join(format!("{}.csv", ticker)))
    }

    /// Load prices from a file synchronously.
    pub fn load_file(path: &Path, columns: &ColumnSpec) -> Result<Vec<PricePoint>, DataError> {
        if !path.exists() {
            return Err(DataError::NotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path).map_err(|e| DataError::Internal(e.to_string()))?;
        let points = read_prices(file, columns, &path.display().to_string())?;
        debug!(path = %path.display(), rows = points.len(), "Loaded price file");
        Ok(points)
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn load_prices(&self, ticker: &str) -> Result<Vec<PricePoint>, DataError> {
        let path = self.path_for(ticker);
        let columns = self.columns.clone();

        tokio::task::spawn_blocking(move || Self::load_file(&path, &columns))
            .await
            .map_err(|e| DataError::Internal(format!("loader task failed: {}", e)))?
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("01/15/2024").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_read_prices_sorts_rows() {
        let csv = "Date,Open,Close\n2020-01-03,1,12.5\n2020-01-02,1,12.0\n";
        let points = read_prices(csv.as_bytes(), &ColumnSpec::default(), "V").unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].timestamp < points[1].timestamp);
        assert_eq!(points[0].price, 12.0);
    }

    #[test]
    fn test_read_prices_alias_column() {
        let csv = "date,adj_close\n2020-01-02,50.0\n";
        let points = read_prices(csv.as_bytes(), &ColumnSpec::default(), "AXP").unwrap();
        assert_eq!(points, vec![PricePoint::new(parse_timestamp("2020-01-02").unwrap(), 50.0)]);
    }

    #[test]
    fn test_read_prices_custom_columns() {
        let csv = "day,last,Close\n2020-01-02,7.0,99.0\n";
        let points = read_prices(csv.as_bytes(), &ColumnSpec::new("day", "last"), "X").unwrap();
        assert_eq!(points[0].price, 7.0);
    }

    #[test]
    fn test_missing_column() {
        let csv = "Date,Volume\n2020-01-02,100\n";
        let err = read_prices(csv.as_bytes(), &ColumnSpec::default(), "V").unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { ref column, .. } if column == "Close"));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let csv = "Date,Close\n2020-01-02,1.0\n2020-01-02,2.0\n";
        let err = read_prices(csv.as_bytes(), &ColumnSpec::default(), "V").unwrap_err();
        assert!(matches!(err, DataError::DuplicateTimestamp { .. }));
    }

    #[test]
    fn test_invalid_prices_rejected() {
        for price in ["0", "-3.5", "NaN", "inf"] {
            let csv = format!("Date,Close\n2020-01-02,{}\n", price);
            let err = read_prices(csv.as_bytes(), &ColumnSpec::default(), "V").unwrap_err();
            assert!(matches!(err, DataError::InvalidPrice { .. }), "{}", price);
        }
    }

    #[test]
    fn test_path_for() {
        let source = CsvPriceSource::new("data").with_file("AXP", "other/axp.csv");
        assert_eq!(source.path_for("V"), PathBuf::from("data").join("V.csv"));
        assert_eq!(source.path_for("AXP"), PathBuf::from("other/axp.csv"));
    }

    #[tokio::test]
    async fn test_load_prices_from_file() {
        let dir = std::env::temp_dir().join(format!("pairs-csv-source-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("V.csv"), "Date,Close\n2020-01-02,180.0\n2020-01-03,181.5\n").unwrap();

        let source = CsvPriceSource::new(&dir);
        let points = source.load_prices("V").await.unwrap();
        assert_eq!(points.len(), 2);

        let missing = source.load_prices("NOPE").await;
        assert!(matches!(missing, Err(DataError::NotFound(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
