//! Results CSV output.

use csv::Writer;
use pairs_core::error::DataError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Serialize `rows` as CSV into `writer`, header first.
pub fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), DataError> {
    let mut csv = Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row).map_err(|e| DataError::WriteError(e.to_string()))?;
    }
    csv.flush().map_err(|e| DataError::WriteError(e.to_string()))
}

/// Write the results file for one pair. The parent directory must exist.
pub fn write_results<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DataError> {
    let file = std::fs::File::create(path)
        .map_err(|e| DataError::WriteError(format!("{}: {}", path.display(), e)))?;
    write_rows(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Wrote results");
    Ok(())
}
