//! Recursive Feature Elimination with Cross-Validation

use crate::cv::KFold;
use crate::linear::LinearModel;
use crate::metrics::root_mean_squared_error;
use crate::SelectionError;
use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cross-validated RMSE for one subset size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvScore {
    pub n_features: usize,
    pub mean_rmse: f64,
    pub std_rmse: f64,
    pub fold_rmse: Vec<f64>,
}

/// Outcome of a cross-validated elimination
#[derive(Debug, Clone)]
pub struct RfecvResult {
    /// Selected columns of the design matrix
    pub support: Vec<bool>,
    /// Elimination rank per column; 1 for selected columns, higher for
    /// columns removed earlier
    pub ranking: Vec<usize>,
    /// Size of the selected subset
    pub n_features: usize,
    /// Scores for every subset size, ascending
    pub cv_results: Vec<CvScore>,
    /// Model refitted on the full training data with the selected columns
    pub model: LinearModel,
}

impl RfecvResult {
    /// Indices of the selected columns, in matrix order
    pub fn selected(&self) -> Vec<usize> {
        (0..self.support.len()).filter(|&j| self.support[j]).collect()
    }
}

/// Eliminates one predictor per step, the one with the smallest absolute
/// least-squares coefficient, and keeps the subset size whose mean
/// validation RMSE across folds is lowest. Ties go to the smaller subset.
#[derive(Debug, Clone)]
pub struct Rfecv {
    kfold: KFold,
    min_features: usize,
}

impl Rfecv {
    pub fn new(folds: usize, min_features: usize) -> Result<Self, SelectionError> {
        Ok(Self {
            kfold: KFold::new(folds)?,
            min_features: min_features.max(1),
        })
    }

    pub fn fit(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<RfecvResult, SelectionError> {
        let p = x.ncols();
        if p == 0 {
            return Err(SelectionError::NoPredictors);
        }
        let min_features = self.min_features.min(p);
        let splits = self.kfold.split(x.nrows())?;

        let mut fold_scores: Vec<Vec<f64>> = Vec::with_capacity(splits.len());
        for (fold, (train, validation)) in splits.iter().enumerate() {
            let x_train = x.select(Axis(0), train);
            let y_train = y.select(Axis(0), train);
            let x_val = x.select(Axis(0), validation);
            let y_val = y.select(Axis(0), validation);

            let mut scores = Vec::with_capacity(p - min_features + 1);
            eliminate(x_train.view(), y_train.view(), min_features, |model| {
                let pred = model.predict(x_val.view());
                scores.push(root_mean_squared_error(y_val.view(), pred.view()));
            })?;
            // Scores were recorded from the full set downwards.
            scores.reverse();
            debug!(
                "Fold {}: {} train / {} validation rows, RMSE with all features {:.2}",
                fold + 1,
                train.len(),
                validation.len(),
                scores.last().copied().unwrap_or(f64::NAN)
            );
            fold_scores.push(scores);
        }

        let cv_results: Vec<CvScore> = (min_features..=p)
            .enumerate()
            .map(|(idx, n_features)| {
                let fold_rmse: Vec<f64> = fold_scores.iter().map(|s| s[idx]).collect();
                let k = fold_rmse.len() as f64;
                let mean = fold_rmse.iter().sum::<f64>() / k;
                let var = fold_rmse.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / k;
                CvScore {
                    n_features,
                    mean_rmse: mean,
                    std_rmse: var.sqrt(),
                    fold_rmse,
                }
            })
            .collect();

        let mut best = &cv_results[0];
        for score in &cv_results[1..] {
            if score.mean_rmse < best.mean_rmse {
                best = score;
            }
        }
        let n_features = best.n_features;
        info!(
            "RFECV selected {} of {} features (CV RMSE {:.2} ± {:.2})",
            n_features, p, best.mean_rmse, best.std_rmse
        );

        let (support, ranking, model) = eliminate(x, y, n_features, |_| {})?;
        Ok(RfecvResult {
            support,
            ranking,
            n_features,
            cv_results,
            model,
        })
    }
}

/// Result of one elimination run: support, ranking and the final model
type Elimination = (Vec<bool>, Vec<usize>, LinearModel);

/// Remove the weakest column until `target` remain, calling `on_step` with
/// the model fitted at every size from the full set down to `target`.
fn eliminate<F>(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    target: usize,
    mut on_step: F,
) -> Result<Elimination, SelectionError>
where
    F: FnMut(&LinearModel),
{
    let p = x.ncols();
    let mut support = vec![true; p];
    let mut ranking = vec![1usize; p];

    loop {
        let features: Vec<usize> = (0..p).filter(|&j| support[j]).collect();
        let model = LinearModel::fit_columns(x, y, &features)?;
        on_step(&model);
        if features.len() <= target {
            return Ok((support, ranking, model));
        }

        let mut order: Vec<usize> = (0..features.len()).collect();
        order.sort_by(|&a, &b| {
            model.coefficients[a]
                .abs()
                .total_cmp(&model.coefficients[b].abs())
        });
        let threshold = 1usize.min(features.len() - target);
        for &o in &order[..threshold] {
            support[features[o]] = false;
        }
        for (rank, &kept) in ranking.iter_mut().zip(&support) {
            if !kept {
                *rank += 1;
            }
        }
    }
}
