//! Table Error Types

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by frame helpers and CSV I/O
#[derive(Debug, Error)]
pub enum TableError {
    /// Filesystem failure on a specific path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure inside polars: malformed CSV, shape mismatch, writer error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Column lookup failed
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// Column name already present
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column holds a different dtype than requested
    #[error("Column {name} is {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: String,
    },

    /// Text cell could not be read as a number
    #[error("Cannot parse {value:?} in column {column} as a number")]
    ParseNumber { column: String, value: String },
}
