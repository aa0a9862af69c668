//! CSV boundary: intent input and snapshot output.
//!
//! ## Intent file
//!
//! ```text
//! resource,actor,imap_full_access,send_as,send_on_behalf   <- header, ignored
//! shared@example.org,alice@example.org,true,false,true
//! ```
//!
//! Columns beyond the fifth are ignored. A flag is set only by the exact,
//! case-sensitive token `true`. A blank line is a malformed row with zero
//! fields, not a separator.
//!
//! ## Snapshot file
//!
//! One row per [`RemoteDelegationRecord`], header generated from its field
//! names. Written to `<path>.tmp` first and renamed into place.

use std::io::Read;
use std::path::{Path, PathBuf};

use maildelegate_core::{DelegationIntent, RemoteDelegationRecord, Rights};

use crate::error::{csv_err, io_err, SyncError};

/// Columns an intent row must supply.
pub const INTENT_FIELDS: usize = 5;

/// Parse a boolean intent column.
pub fn parse_flag(field: &str) -> bool {
    field == "true"
}

/// Read all intents from the file at `path`, skipping the header row.
pub fn read_intents(path: &Path) -> Result<Vec<DelegationIntent>, SyncError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SyncError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            io_err(path, e)
        }
    })?;
    let intents = read_intents_from(file, path)?;
    tracing::info!(path = %path.display(), count = intents.len(), "read intent records");
    Ok(intents)
}

/// Read intents from any reader; `path` is only used in error messages.
pub fn read_intents_from<R: Read>(
    mut reader: R,
    path: &Path,
) -> Result<Vec<DelegationIntent>, SyncError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| io_err(path, e))?;

    // The csv reader drops empty lines silently.
    if let Some(line) = first_blank_line(&text) {
        return Err(SyncError::MalformedInput {
            path: path.to_path_buf(),
            line,
            found: 0,
            expected: INTENT_FIELDS,
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut intents = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| csv_err(path, e))?;
        if record.len() < INTENT_FIELDS {
            return Err(SyncError::MalformedInput {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                found: record.len(),
                expected: INTENT_FIELDS,
            });
        }
        intents.push(DelegationIntent {
            resource_email: record[0].to_string(),
            actor_email: record[1].to_string(),
            rights: Rights::new(
                parse_flag(&record[2]),
                parse_flag(&record[3]),
                parse_flag(&record[4]),
            ),
        });
    }
    Ok(intents)
}

/// 1-based number of the first empty line that is not inside a quoted field.
fn first_blank_line(text: &str) -> Option<u64> {
    let mut in_quotes = false;
    for (number, line) in (1u64..).zip(text.lines()) {
        if !in_quotes && line.is_empty() {
            return Some(number);
        }
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }
    None
}

/// Write `records` to `path`, replacing any existing file.
///
/// Returns [`SyncError::EmptyResult`] without touching the filesystem when
/// `records` is empty.
pub fn write_snapshot(path: &Path, records: &[RemoteDelegationRecord]) -> Result<(), SyncError> {
    if records.is_empty() {
        return Err(SyncError::EmptyResult);
    }

    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    let mut wtr = csv::Writer::from_path(&tmp).map_err(|e| csv_err(&tmp, e))?;
    for record in records {
        wtr.serialize(record).map_err(|e| csv_err(&tmp, e))?;
    }
    wtr.flush().map_err(|e| io_err(&tmp, e))?;
    drop(wtr);

    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    tracing::info!(path = %path.display(), count = records.len(), "wrote snapshot");
    Ok(())
}

/// Read a snapshot previously produced by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<Vec<RemoteDelegationRecord>, SyncError> {
    let mut rdr = csv::Reader::from_path(path).map_err(|e| csv_err(path, e))?;
    rdr.deserialize()
        .map(|row| row.map_err(|e| csv_err(path, e)))
        .collect()
}
