//! Listing Table
//!
//! Shared `polars` plumbing for every pipeline stage. CSV files are always
//! loaded with every column as text; stages convert columns to integers or
//! floats explicitly. Writes are staged in temporary files and renamed into
//! place together.

mod csv_io;
mod error;
mod frame;

pub use csv_io::{read_csv, write_csv, write_pair, StagedFiles};
pub use error::TableError;
pub use frame::{column_names, insert_new, ints, numeric, rename_columns, replace, take_rows, text};
