//! Train/Test Feature Selection

use crate::config::SelectorConfig;
use crate::linear::LinearModel;
use crate::metrics::{root_mean_squared_error, RegressionMetrics};
use crate::rfecv::{CvScore, Rfecv};
use crate::SelectionError;
use listing_table::{column_names, numeric, read_csv, StagedFiles, TableError};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Elimination rank of one predictor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRank {
    pub name: String,
    pub rank: usize,
}

/// Summary of a selection run, persisted next to the processed tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub target: String,
    pub predictors_considered: usize,
    pub n_selected: usize,
    pub selected: Vec<String>,
    pub ranking: Vec<FeatureRank>,
    pub cv_folds: usize,
    pub cv_results: Vec<CvScore>,
    /// All-predictor OLS fit, scored on the training rows
    pub baseline_train_rmse: f64,
    /// All-predictor OLS fit, scored on the test rows
    pub baseline_test: RegressionMetrics,
}

impl SelectionReport {
    /// Pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<Vec<u8>, SelectionError> {
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        Ok(json)
    }

    /// Write the report as pretty JSON; the file only appears once complete.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SelectionError> {
        let mut staged = StagedFiles::new();
        staged.bytes(&self.to_json()?, path.as_ref())?;
        staged.persist()?;
        debug!("Selection report written to {}", path.as_ref().display());
        Ok(())
    }
}

/// Reduced partitions plus the report that produced them
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub train: DataFrame,
    pub test: DataFrame,
    pub report: SelectionReport,
}

/// Chooses predictors on the training partition and projects both
/// partitions onto them
pub struct FeatureSelector {
    config: SelectorConfig,
}

impl FeatureSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Predictor columns of `df`: everything except the target and the
    /// excluded columns, in frame order
    pub fn predictors(&self, df: &DataFrame) -> Vec<String> {
        column_names(df)
            .into_iter()
            .filter(|n| *n != self.config.target && !self.config.excluded.contains(n))
            .collect()
    }

    pub fn select(&self, train: &DataFrame, test: &DataFrame) -> Result<SelectionOutcome, SelectionError> {
        let target = self.config.target.as_str();
        let predictors = self.predictors(train);
        if predictors.is_empty() {
            return Err(SelectionError::NoPredictors);
        }
        info!(
            "Selecting among {} predictors on {} training rows",
            predictors.len(),
            train.height()
        );

        let x_train = design_matrix(train, &predictors)?;
        let y_train = target_vector(train, target)?;
        let x_test = design_matrix(test, &predictors)?;
        let y_test = target_vector(test, target)?;

        let baseline = LinearModel::fit(x_train.view(), y_train.view())?;
        let baseline_train_rmse =
            root_mean_squared_error(y_train.view(), baseline.predict(x_train.view()).view());
        let baseline_test = RegressionMetrics::compute(y_test.view(), baseline.predict(x_test.view()).view());
        info!(
            "Baseline OLS on test: MAE {:.2}, R2 {:.4}, RMSE {:.2}",
            baseline_test.mean_absolute_error, baseline_test.r2_score, baseline_test.root_mean_squared_error
        );

        let rfecv = Rfecv::new(self.config.cv_folds, self.config.min_features)?;
        let result = rfecv.fit(x_train.view(), y_train.view())?;

        let selected: Vec<String> = result.selected().into_iter().map(|j| predictors[j].clone()).collect();
        let ranking = predictors
            .iter()
            .zip(&result.ranking)
            .map(|(name, &rank)| FeatureRank {
                name: name.clone(),
                rank,
            })
            .collect();

        let mut keep = selected.clone();
        keep.push(target.to_string());
        let train_out = train.select(keep.iter().map(String::as_str)).map_err(TableError::from)?;
        let test_out = test.select(keep.iter().map(String::as_str)).map_err(TableError::from)?;
        info!("Kept {} of {} predictors: {:?}", selected.len(), predictors.len(), selected);

        Ok(SelectionOutcome {
            train: train_out,
            test: test_out,
            report: SelectionReport {
                target: target.to_string(),
                predictors_considered: predictors.len(),
                n_selected: selected.len(),
                selected,
                ranking,
                cv_folds: self.config.cv_folds,
                cv_results: result.cv_results,
                baseline_train_rmse,
                baseline_test,
            },
        })
    }

    /// Read both partitions, select, and write the processed tables and
    /// the report together. Existing outputs are untouched if any step fails.
    pub fn run_files(
        &self,
        train_path: impl AsRef<Path>,
        test_path: impl AsRef<Path>,
        train_out: impl AsRef<Path>,
        test_out: impl AsRef<Path>,
        report_path: impl AsRef<Path>,
    ) -> Result<SelectionReport, SelectionError> {
        let train = read_csv(train_path)?;
        let test = read_csv(test_path)?;
        let mut outcome = self.select(&train, &test)?;
        let json = outcome.report.to_json()?;

        let mut staged = StagedFiles::new();
        staged
            .csv(&mut outcome.train, train_out)?
            .csv(&mut outcome.test, test_out)?
            .bytes(&json, report_path.as_ref())?;
        staged.persist()?;
        debug!("Selection report written to {}", report_path.as_ref().display());
        Ok(outcome.report)
    }
}

fn design_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>, SelectionError> {
    let mut x = Array2::<f64>::zeros((df.height(), columns.len()));
    for (j, name) in columns.iter().enumerate() {
        let values = numeric(df, name)?;
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SelectionError::NonFinite(name.clone()));
        }
        for (i, v) in values.into_iter().enumerate() {
            x[[i, j]] = v;
        }
    }
    Ok(x)
}

fn target_vector(df: &DataFrame, target: &str) -> Result<Array1<f64>, SelectionError> {
    let values = numeric(df, target)?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SelectionError::NonFinite(target.to_string()));
    }
    Ok(Array1::from(values))
}
