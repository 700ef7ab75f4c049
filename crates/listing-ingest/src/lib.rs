//! Listing Ingestion
//!
//! Reads the scraper's append-only log (one flat JSON object per line) and
//! stages it as a CSV file where every value is kept as text. Columns appear
//! in the order their keys were first seen.

use listing_table::{column_names, text, write_csv, TableError};
use polars::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors during ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {line}: expected a JSON object")]
    NotAnObject { line: usize },
    #[error("Line {line}: field {field} holds a nested value")]
    NestedValue { line: usize, field: String },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records written
    pub records: usize,
    /// Distinct fields across all records
    pub columns: usize,
    /// Blank lines skipped
    pub blank_lines: usize,
}

/// Convert the JSON-lines file at `input` into a CSV file at `output`
pub fn ingest_json_lines(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<IngestSummary, IngestError> {
    let (input, output) = (input.as_ref(), output.as_ref());
    info!("Starting ingestion of {}", input.display());

    let file = File::open(input).map_err(|source| IngestError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let mut builder = RecordTable::default();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| IngestError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        builder.push_line(n + 1, &line)?;
    }

    let blank_lines = builder.blank_lines;
    let mut df = builder.finish()?;
    write_csv(&mut df, output)?;

    let summary = IngestSummary {
        records: df.height(),
        columns: df.width(),
        blank_lines,
    };
    info!(
        "Ingestion finished: {} records, {} columns -> {}",
        summary.records,
        summary.columns,
        output.display()
    );
    Ok(summary)
}

/// Parse JSON lines from any reader into a text-only frame
pub fn read_records<R: BufRead>(reader: R) -> Result<DataFrame, IngestError> {
    let mut builder = RecordTable::default();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| IngestError::Read {
            path: PathBuf::from("<reader>"),
            source,
        })?;
        builder.push_line(n + 1, &line)?;
    }
    builder.finish()
}

/// Accumulates records whose key sets differ into one rectangular table
#[derive(Default)]
struct RecordTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
    cells: Vec<Vec<Option<String>>>,
    rows: usize,
    blank_lines: usize,
}

impl RecordTable {
    fn push_line(&mut self, line_no: usize, line: &str) -> Result<(), IngestError> {
        if line.trim().is_empty() {
            self.blank_lines += 1;
            return Ok(());
        }
        let value: Value = serde_json::from_str(line).map_err(|source| IngestError::Json {
            line: line_no,
            source,
        })?;
        let Value::Object(record) = value else {
            return Err(IngestError::NotAnObject { line: line_no });
        };

        for (key, value) in record {
            let text = match value {
                Value::Null => None,
                // Empty text reads back from CSV as missing, so store it that way.
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(IngestError::NestedValue {
                        line: line_no,
                        field: key,
                    })
                }
            };
            let col = self.column_index(key);
            self.cells[col].resize(self.rows, None);
            self.cells[col].push(text);
        }

        self.rows += 1;
        Ok(())
    }

    fn column_index(&mut self, key: String) -> usize {
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.names.len();
        debug!("New field {} first seen at record {}", key, self.rows + 1);
        self.index.insert(key.clone(), i);
        self.names.push(key);
        self.cells.push(Vec::new());
        i
    }

    fn finish(self) -> Result<DataFrame, IngestError> {
        let rows = self.rows;
        let columns: Vec<Column> = self
            .names
            .into_iter()
            .zip(self.cells)
            .map(|(name, mut values)| {
                values.resize(rows, None);
                Series::new(name.as_str().into(), values).into()
            })
            .collect();
        Ok(DataFrame::new(columns).map_err(TableError::from)?)
    }
}
