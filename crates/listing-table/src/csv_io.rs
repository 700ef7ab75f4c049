//! CSV Loading and Atomic Persistence

use crate::error::TableError;
use polars::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{debug, warn};

/// Load a CSV file with a header row. Every column is read as text and
/// empty cells become missing values.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame, TableError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(TableError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Write `df` to `path`. The file only appears once fully written.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<(), TableError> {
    let mut staged = StagedFiles::new();
    staged.csv(df, path)?;
    staged.persist()
}

/// Write two frames, staging both before either destination is replaced.
pub fn write_pair(
    first: &mut DataFrame,
    first_path: impl AsRef<Path>,
    second: &mut DataFrame,
    second_path: impl AsRef<Path>,
) -> Result<(), TableError> {
    let mut staged = StagedFiles::new();
    staged.csv(first, first_path)?.csv(second, second_path)?;
    staged.persist()
}

struct Staged {
    tmp: NamedTempFile,
    path: PathBuf,
}

/// A destination already renamed into place, with the file it replaced
struct Replaced {
    path: PathBuf,
    previous: Option<TempPath>,
}

/// Output files written next to their destinations and renamed into place
/// together.
///
/// If any rename fails, destinations already replaced get their previous
/// content back (or are removed when they did not exist), so a failed
/// commit leaves every destination as it was.
#[derive(Default)]
pub struct StagedFiles {
    staged: Vec<Staged>,
}

impl StagedFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `df` as CSV with a header row
    pub fn csv(&mut self, df: &mut DataFrame, path: impl AsRef<Path>) -> Result<&mut Self, TableError> {
        let path = path.as_ref();
        let mut tmp = temp_beside(path)?;
        CsvWriter::new(tmp.as_file_mut()).include_header(true).finish(df)?;
        self.staged.push(Staged {
            tmp,
            path: path.to_path_buf(),
        });
        Ok(self)
    }

    /// Stage raw bytes
    pub fn bytes(&mut self, data: &[u8], path: impl AsRef<Path>) -> Result<&mut Self, TableError> {
        let path = path.as_ref();
        let mut tmp = temp_beside(path)?;
        tmp.write_all(data).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.staged.push(Staged {
            tmp,
            path: path.to_path_buf(),
        });
        Ok(self)
    }

    /// Rename every staged file into place, in staging order
    pub fn persist(self) -> Result<(), TableError> {
        let mut replaced: Vec<Replaced> = Vec::with_capacity(self.staged.len());
        for Staged { tmp, path } in self.staged {
            let previous = match set_aside(&path) {
                Ok(previous) => previous,
                Err(err) => {
                    roll_back(replaced);
                    return Err(err);
                }
            };
            match tmp.persist(&path) {
                Ok(_) => {
                    debug!("Persisted {}", path.display());
                    replaced.push(Replaced { path, previous });
                }
                Err(err) => {
                    replaced.push(Replaced {
                        path: path.clone(),
                        previous,
                    });
                    roll_back(replaced);
                    return Err(TableError::Io {
                        path,
                        source: err.error,
                    });
                }
            }
        }
        Ok(())
    }
}

fn temp_beside(path: &Path) -> Result<NamedTempFile, TableError> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|source| TableError::Io {
        path: dir.clone(),
        source,
    })?;
    NamedTempFile::new_in(&dir).map_err(|source| TableError::Io { path: dir, source })
}

/// Move an existing destination file to a temporary path in the same
/// directory. The returned path deletes the old content when dropped.
fn set_aside(path: &Path) -> Result<Option<TempPath>, TableError> {
    if !path.exists() {
        return Ok(None);
    }
    let io_err = |source: std::io::Error| TableError::Io {
        path: path.to_path_buf(),
        source,
    };
    let previous = tempfile::Builder::new()
        .prefix(".previous")
        .tempfile_in(parent_dir(path))
        .map_err(io_err)?
        .into_temp_path();
    fs::rename(path, &previous).map_err(io_err)?;
    Ok(Some(previous))
}

fn roll_back(replaced: Vec<Replaced>) {
    for Replaced { path, previous } in replaced.into_iter().rev() {
        let restored = match previous {
            Some(previous) => previous.persist(&path).map_err(|e| e.error),
            None => match fs::remove_file(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        match restored {
            Ok(()) => debug!("Restored {}", path.display()),
            Err(e) => warn!("Cannot restore {}: {}", path.display(), e),
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
