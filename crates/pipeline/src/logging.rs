//! Logging Initialisation

use crate::config::LoggingConfig;
use crate::error::{PipelineError, Stage, StageContext};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// `<log_dir>/YYYY/MM/DD/HH_MM_SS.log` for the given start time
pub fn log_file_path(log_dir: &Path, started: DateTime<Local>) -> PathBuf {
    log_dir
        .join(started.format("%Y/%m/%d").to_string())
        .join(started.format("%H_%M_%S.log").to_string())
}

/// Install the global subscriber: stdout, plus a plain-text file when
/// enabled. Returns the log file path, if any.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>, PipelineError> {
    let stdout = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    let (file_layer, path) = if config.to_file {
        let path = log_file_path(&config.log_dir, Local::now());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).in_stage(Stage::Logging)?;
        }
        let file = File::create(&path).in_stage(Stage::Logging)?;
        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_writer(Mutex::new(file));
        (Some(layer), Some(path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(stdout)
        .with(file_layer)
        .try_init()
        .in_stage(Stage::Logging)?;
    Ok(path)
}
