//! Cleaning Error Types

use listing_table::TableError;
use thiserror::Error;

/// Errors during listing cleanup
#[derive(Debug, Error)]
pub enum CleanError {
    /// Digits left after stripping do not fit an integer
    #[error("{column} value {value:?} does not fit in a 64-bit integer")]
    Overflow { column: String, value: String },

    /// Correction rule that cannot be applied
    #[error("Invalid correction rule for {column}: {reason}")]
    InvalidRule { column: String, reason: String },

    /// Address pattern failed to compile
    #[error("Invalid address pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Underlying table failure
    #[error(transparent)]
    Table(#[from] TableError),
}
