//! Pipeline Configuration
//!
//! Built once at startup from built-in defaults, an optional TOML file and
//! `ZAP_` environment variables (nested keys separated by `__`, e.g.
//! `ZAP_FEATURES__SPLIT__SEED=7`), then handed to every stage.

use crate::error::{PipelineError, Stage, StageContext};
use config::{Config, Environment, File, FileFormat};
use data_cleaner::CleaningConfig;
use feature_engine::FeatureConfig;
use feature_selector::SelectorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files read and written by the stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    /// Scraper output, one JSON object per line
    pub raw_json: PathBuf,
    /// Ingested CSV, every column as text
    pub raw_csv: PathBuf,
    pub train: PathBuf,
    pub test: PathBuf,
    pub processed_train: PathBuf,
    pub processed_test: PathBuf,
    pub selection_report: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            raw_json: PathBuf::from("data/raw/imoveis.json"),
            raw_csv: PathBuf::from("artifacts/data.csv"),
            train: PathBuf::from("artifacts/train.csv"),
            test: PathBuf::from("artifacts/test.csv"),
            processed_train: PathBuf::from("artifacts/train_processed.csv"),
            processed_test: PathBuf::from("artifacts/test_processed.csv"),
            selection_report: PathBuf::from("artifacts/selection_report.json"),
        }
    }
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: ArtifactPaths,
    pub logging: LoggingConfig,
    pub cleaning: CleaningConfig,
    pub features: FeatureConfig,
    pub selector: SelectorConfig,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Root of the dated log tree
    pub log_dir: PathBuf,
    /// Also write to a file under `log_dir`
    pub to_file: bool,
    /// Emit JSON lines on stdout
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            to_file: true,
            json: false,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then `path` if given, then `ZAP_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("ZAP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .in_stage(Stage::Config)?;
        let parsed: Self = config.try_deserialize().in_stage(Stage::Config)?;
        parsed.validate()?;
        Ok(parsed)
    }

    /// Reject settings no stage could honour
    pub fn validate(&self) -> Result<(), PipelineError> {
        let fraction = self.features.split.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(PipelineError::from_message(
                Stage::Config,
                format!("test_fraction must be in (0, 1), got {}", fraction),
            ));
        }
        if self.selector.cv_folds < 2 {
            return Err(PipelineError::from_message(
                Stage::Config,
                format!("cv_folds must be at least 2, got {}", self.selector.cv_folds),
            ));
        }
        Ok(())
    }

    /// Place every artifact and the log tree under `root`
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let p = &mut self.paths;
        for path in [
            &mut p.raw_json,
            &mut p.raw_csv,
            &mut p.train,
            &mut p.test,
            &mut p.processed_train,
            &mut p.processed_test,
            &mut p.selection_report,
            &mut self.logging.log_dir,
        ] {
            *path = root.join(&*path);
        }
        self
    }
}
