//! CSV export of the record collections.
//!
//! Headers come from the record field names. Files are truncated before writing,
//! so exporting the same records twice yields the same bytes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { path: PathBuf, rows: usize },
    /// Export not requested, or nothing to write.
    Skipped,
}

/// Writes `records` to `path` when `enabled` and there is at least one record.
pub fn export_records<T: Serialize>(
    enabled: bool,
    path: &Path,
    records: &[T],
) -> Result<ExportOutcome, ExportError> {
    if !enabled || records.is_empty() {
        return Ok(ExportOutcome::Skipped);
    }

    let rows = write_csv(path, records)?;
    Ok(ExportOutcome::Written {
        path: path.to_path_buf(),
        rows,
    })
}

/// Writes a header plus one row per record. Returns the number of records written.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| ExportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(records.len())
}
