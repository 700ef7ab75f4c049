//! Feature Engineering Error Types

use listing_table::TableError;
use thiserror::Error;

/// Errors during feature engineering
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Creation date that matches none of the accepted formats
    #[error("Row {row}: cannot parse date {value:?}")]
    InvalidDate { row: usize, value: String },

    /// Sum that does not fit a 64-bit integer
    #[error("Row {row}: {column} does not fit in a 64-bit integer")]
    Overflow { column: String, row: usize },

    /// Split parameters that leave a partition empty
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Underlying table failure
    #[error(transparent)]
    Table(#[from] TableError),
}
