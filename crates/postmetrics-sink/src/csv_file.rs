//! CSV file sink. Always overwrites; there is no append mode.

use std::path::Path;

use postmetrics_core::{EngagementRow, COLUMNS};

use crate::error::SinkError;

/// Write `rows` to `path` as UTF-8 CSV with a header row, replacing any
/// existing file. An empty table still produces the header.
///
/// # Errors
///
/// Returns [`SinkError::Csv`] if the file cannot be created or a row cannot
/// be serialized, or [`SinkError::Io`] if the final flush fails.
pub fn write_csv(path: &Path, rows: &[EngagementRow]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path)?;
    if rows.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

/// Read a file produced by [`write_csv`] back into rows.
#[cfg(test)]
pub(crate) fn read_csv(path: &Path) -> Result<Vec<EngagementRow>, SinkError> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize::<EngagementRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
