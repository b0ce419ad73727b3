//! CSV persistence of a finished capture.
//!
//! Records are written verbatim: one header line, then one line per record, no
//! quoting or escaping. The file is opened for append, matching the behaviour
//! operators rely on when they point several captures at the same file.
use crate::data::{Dataset, Header};
use crate::error::{AppResult, DaqError};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes `header` then every record of `dataset` to `path`.
///
/// Returns the number of records written. The file is synced before returning.
pub fn write_dataset(path: &Path, header: &Header, dataset: &Dataset) -> AppResult<usize> {
    let storage_err = |source: std::io::Error| DaqError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(storage_err)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(header.as_str().as_bytes())
        .map_err(storage_err)?;
    for record in dataset.iter() {
        writer
            .write_all(record.as_str().as_bytes())
            .map_err(storage_err)?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| storage_err(e.into_error()))?;
    file.sync_all().map_err(storage_err)?;

    info!(path = %path.display(), rows = dataset.len(), "CSV file written");
    Ok(dataset.len())
}
