//! Feature Selection
//!
//! Fits an ordinary least-squares baseline (`linfa-linear`) on the training
//! partition and runs
//! recursive feature elimination with K-fold cross-validation to find the
//! predictor subset with the lowest cross-validated RMSE. The test partition
//! is only ever projected onto the selected columns.

mod config;
mod cv;
mod linear;
mod metrics;
mod rfecv;
mod selector;

pub use config::SelectorConfig;
pub use cv::KFold;
pub use linear::LinearModel;
pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error, RegressionMetrics};
pub use rfecv::{CvScore, Rfecv, RfecvResult};
pub use selector::{FeatureRank, FeatureSelector, SelectionOutcome, SelectionReport};

use listing_table::TableError;
use thiserror::Error;

/// Errors during feature selection
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No predictor columns left after dropping target and excluded columns")]
    NoPredictors,
    #[error("{samples} samples cannot be split into {folds} folds")]
    TooFewSamples { samples: usize, folds: usize },
    #[error("Invalid fold count {0}, need at least 2")]
    InvalidFolds(usize),
    #[error("Non-finite value in column {0}")]
    NonFinite(String),
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("Least-squares fit failed: {0}")]
    Linear(#[from] linfa_linear::LinearError<f64>),
    #[error("Cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}
