//! Listing Price Pipeline
//!
//! Ingests the scraper log, engineers model-ready features, splits them into
//! train and test partitions, and selects the predictors handed to training.

mod config;
mod error;
mod logging;
mod stages;

pub use config::{ArtifactPaths, LoggingConfig, PipelineConfig};
pub use error::{PipelineError, Stage, StageContext};
pub use logging::{init_logging, log_file_path};
pub use stages::{Pipeline, RunSummary, TransformSummary};
