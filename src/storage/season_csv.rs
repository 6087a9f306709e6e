//! CSV storage for the season table.
//!
//! Files are UTF-8 with a byte-order mark so spreadsheet tools pick the right
//! encoding. The header row holds every upstream column name, not only the
//! modelled ones; the whole file is rewritten on every save.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::StorageError;
use crate::models::{cell_string, ResultSet, SeasonTable};

const BOM: &str = "\u{feff}";

/// Encode a result set as CSV, without a byte-order mark. Null cells are empty.
pub fn encode_table(set: &ResultSet) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&set.headers)?;
    for row in &set.row_set {
        writer.write_record(row.iter().map(|cell| cell_string(cell).unwrap_or_default()))?;
    }

    writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))
}

/// Write a season table with all its columns, replacing any existing file.
/// Returns the row count.
pub fn write_table(path: &Path, table: &SeasonTable) -> Result<usize, StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut content = BOM.as_bytes().to_vec();
    content.extend(encode_table(table.source())?);

    // Write beside the target, then swap in
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, &content)?;
    if let Err(e) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!("Failed to remove {:?}: {}", tmp, cleanup);
        }
        return Err(e.into());
    }

    info!(
        "Wrote {} rows ({} columns) to {:?}",
        table.len(),
        table.source().headers.len(),
        path
    );
    Ok(table.len())
}

/// Decode CSV text into a result set of string cells.
pub fn decode_result_set(name: &str, text: &str) -> Result<ResultSet, StorageError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| Value::String(field.to_string()))
                .collect(),
        );
    }

    Ok(ResultSet::new(name, headers, rows))
}

/// Read a season table. Extra columns are kept in the result set but not
/// modelled; missing modelled columns are an error.
pub fn read_table(path: &Path) -> Result<SeasonTable, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    let set = decode_result_set(&path.display().to_string(), &text)?;
    let table = SeasonTable::from_result_set(set)?;

    debug!("Read {} rows from {:?}", table.len(), path);
    Ok(table)
}
