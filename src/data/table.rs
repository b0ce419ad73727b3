//! Best-effort read-back of the written CSV for charting.
//!
//! Row shape is never validated at capture time, so this reader skips what it
//! cannot use instead of failing: rows wider than the header are dropped, short
//! rows are padded with gaps, and cells that are not numbers become gaps.
use crate::error::{AppResult, DaqError};
use std::path::Path;

/// Numeric view of a CSV file. `None` cells are gaps in the chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names, from the header or generated as `column N`.
    pub columns: Vec<String>,
    /// Data rows, each exactly `columns.len()` wide.
    pub rows: Vec<Vec<Option<f64>>>,
    /// Rows dropped because they could not be read or were too wide.
    pub skipped: usize,
}

impl Table {
    /// Values of one column in row order.
    pub fn column(&self, index: usize) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(index).copied().flatten())
            .collect()
    }
}

/// Reads `path`, taking the first row as column names when `has_header` is set.
#[cfg(feature = "storage_csv")]
pub fn read_table(path: &Path, has_header: bool) -> AppResult<Table> {
    use tracing::{debug, warn};

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DaqError::TableRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut columns: Option<Vec<String>> = None;
    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    let mut skipped = 0;

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 1, error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        if has_header && columns.is_none() {
            columns = Some(record.iter().map(str::to_string).collect());
            continue;
        }
        raw_rows.push(record);
    }

    let columns = columns.unwrap_or_else(|| {
        let width = raw_rows.iter().map(csv::StringRecord::len).max().unwrap_or(0);
        (1..=width).map(|n| format!("column {n}")).collect()
    });

    let mut rows = Vec::with_capacity(raw_rows.len());
    for record in raw_rows {
        if record.len() > columns.len() {
            warn!(
                fields = record.len(),
                columns = columns.len(),
                "skipping row wider than header"
            );
            skipped += 1;
            continue;
        }
        let mut row: Vec<Option<f64>> = record.iter().map(|f| f.parse().ok()).collect();
        row.resize(columns.len(), None);
        rows.push(row);
    }

    debug!(
        path = %path.display(),
        columns = columns.len(),
        rows = rows.len(),
        skipped,
        "table read back"
    );
    Ok(Table {
        columns,
        rows,
        skipped,
    })
}

#[cfg(not(feature = "storage_csv"))]
pub fn read_table(_path: &Path, _has_header: bool) -> AppResult<Table> {
    Err(DaqError::FeatureNotEnabled("storage_csv".to_string()))
}
