//! Error types for maildelegate-sync.

use std::path::PathBuf;

use thiserror::Error;

use maildelegate_directory::DirectoryError;

/// All errors that can abort an apply or query run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A directory API call failed.
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// A connectivity failure stopped the apply batch part-way.
    #[error("apply aborted after {applied} of {total} records: {source}")]
    ApplyAborted {
        applied: usize,
        total: usize,
        #[source]
        source: DirectoryError,
    },

    /// The intent file does not exist.
    #[error("input file {path} not found")]
    MissingFile { path: PathBuf },

    /// An intent row has fewer columns than required.
    #[error("incorrect input file: {path} (line {line} has {found} fields, expected {expected})")]
    MalformedInput {
        path: PathBuf,
        line: u64,
        found: usize,
        expected: usize,
    },

    /// Query mode found no delegation edges, so there is no header to write.
    #[error("no delegation records found; nothing to write")]
    EmptyResult,

    /// CSV read/write failure, with annotated path for context.
    #[error("CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The confirmation prompt could not be read.
    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Csv`].
pub(crate) fn csv_err(path: impl Into<PathBuf>, source: csv::Error) -> SyncError {
    SyncError::Csv {
        path: path.into(),
        source,
    }
}
