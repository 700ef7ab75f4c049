//! Ordinary Least Squares
//!
//! Fits go through `linfa_linear::LinearRegression` on a `linfa` dataset.
//! The normal equations it solves have no unique solution when a column is
//! constant or a linear combination of other columns, which engineered
//! listing features often are (fixed cost is condo fee plus IPTU, the amenity
//! count is a sum of indicators). Such columns are screened out before the
//! fit and keep a 0 coefficient.

use crate::SelectionError;
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use tracing::trace;

/// Residual norm, relative to the centered column norm, below which a column
/// counts as dependent on the columns kept before it
const DEPENDENCE_TOLERANCE: f64 = 1e-7;

/// Fitted linear model over a set of design matrix columns
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    /// One coefficient per entry of `columns`
    pub coefficients: Vec<f64>,
    /// Column indices of the design matrix the model was fitted on
    pub columns: Vec<usize>,
}

impl LinearModel {
    /// Least-squares fit of `y` on every column of `x`
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self, SelectionError> {
        let columns: Vec<usize> = (0..x.ncols()).collect();
        Self::fit_columns(x, y, &columns)
    }

    /// Least-squares fit of `y` on the given columns of `x`
    pub fn fit_columns(x: ArrayView2<f64>, y: ArrayView1<f64>, columns: &[usize]) -> Result<Self, SelectionError> {
        if x.nrows() != y.len() {
            return Err(ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape).into());
        }
        let y_mean = y.mean().ok_or(SelectionError::TooFewSamples { samples: 0, folds: 1 })?;
        let mut coefficients = vec![0.0; columns.len()];

        let active = independent_columns(x, columns);
        if active.is_empty() {
            return Ok(Self {
                intercept: y_mean,
                coefficients,
                columns: columns.to_vec(),
            });
        }
        if active.len() < columns.len() {
            trace!("Fitting {} of {} columns, the rest are dependent", active.len(), columns.len());
        }

        let selected: Vec<usize> = active.iter().map(|&k| columns[k]).collect();
        let dataset = Dataset::new(x.select(Axis(1), &selected), y.to_owned());
        let fitted = LinearRegression::new().fit(&dataset)?;
        for (&k, &beta) in active.iter().zip(fitted.params().iter()) {
            coefficients[k] = beta;
        }

        Ok(Self {
            intercept: fitted.intercept(),
            coefficients,
            columns: columns.to_vec(),
        })
    }

    /// Predict for every row of `x`, reading the model's columns
    pub fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        let beta = Array1::from(self.coefficients.clone());
        x.select(Axis(1), &self.columns).dot(&beta) + self.intercept
    }
}

/// Positions in `columns` that are neither constant nor linearly dependent
/// on the positions kept before them, found by Gram-Schmidt over the
/// centered columns.
fn independent_columns(x: ArrayView2<f64>, columns: &[usize]) -> Vec<usize> {
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut keep = Vec::new();
    for (k, &c) in columns.iter().enumerate() {
        let column = x.column(c);
        let mut v = &column - column.mean().unwrap_or(0.0);
        let initial = v.dot(&v).sqrt();
        if !(initial.is_finite() && initial > 0.0) {
            continue;
        }
        for q in &basis {
            let projection = q.dot(&v);
            v.scaled_add(-projection, q);
        }
        let residual = v.dot(&v).sqrt();
        if residual <= DEPENDENCE_TOLERANCE * initial {
            continue;
        }
        v /= residual;
        basis.push(v);
        keep.push(k);
    }
    keep
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_exact_fit() {
        // y = 3 + 2·x0 - x1
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 5.0], [4.0, 2.0], [0.0, 7.0]];
        let y: Array1<f64> = x.outer_iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
        let model = LinearModel::fit(x.view(), y.view()).unwrap();

        assert_close(model.intercept, 3.0);
        assert_close(model.coefficients[0], 2.0);
        assert_close(model.coefficients[1], -1.0);

        let pred = model.predict(x.view());
        for (p, t) in pred.iter().zip(y.iter()) {
            assert_close(*p, *t);
        }
    }

    #[test]
    fn test_least_squares_line() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![1.0, 3.0, 2.0, 4.0];
        let model = LinearModel::fit(x.view(), y.view()).unwrap();
        assert_close(model.coefficients[0], 0.8);
        assert_close(model.intercept, 1.3);
    }

    #[test]
    fn test_collinear_and_constant_columns() {
        // x1 = 2·x0, x2 constant, x3 = x0 + x1
        let x = array![
            [1.0, 2.0, 7.0, 3.0],
            [2.0, 4.0, 7.0, 6.0],
            [3.0, 6.0, 7.0, 9.0],
            [5.0, 10.0, 7.0, 15.0]
        ];
        let y = array![2.0, 4.0, 6.0, 10.0];
        let model = LinearModel::fit(x.view(), y.view()).unwrap();

        assert_close(model.coefficients[0], 2.0);
        assert_eq!(model.coefficients[1], 0.0);
        assert_eq!(model.coefficients[2], 0.0);
        assert_eq!(model.coefficients[3], 0.0);
        let pred = model.predict(x.view());
        for (p, t) in pred.iter().zip(y.iter()) {
            assert_close(*p, *t);
        }
    }

    #[test]
    fn test_column_subset_matches_reduced_matrix() {
        let x = array![[1.0, 4.0, 2.0], [2.0, 1.0, 0.0], [3.0, 3.0, 1.0], [4.0, 0.0, 5.0], [6.0, 2.0, 2.0]];
        let y = array![1.0, 2.0, 4.0, 3.0, 7.0];
        let subset = LinearModel::fit_columns(x.view(), y.view(), &[0, 2]).unwrap();

        let reduced = array![[1.0, 2.0], [2.0, 0.0], [3.0, 1.0], [4.0, 5.0], [6.0, 2.0]];
        let direct = LinearModel::fit(reduced.view(), y.view()).unwrap();
        assert_close(subset.intercept, direct.intercept);
        assert_close(subset.coefficients[0], direct.coefficients[0]);
        assert_close(subset.coefficients[1], direct.coefficients[1]);

        let pred_subset = subset.predict(x.view());
        let pred_direct = direct.predict(reduced.view());
        for (a, b) in pred_subset.iter().zip(pred_direct.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn test_empty_subset_predicts_mean() {
        let x = array![[1.0], [2.0]];
        let y = array![3.0, 5.0];
        let model = LinearModel::fit_columns(x.view(), y.view(), &[]).unwrap();
        assert_close(model.intercept, 4.0);
        assert_eq!(model.predict(x.view()).to_vec(), vec![4.0, 4.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![3.0];
        assert!(matches!(
            LinearModel::fit(x.view(), y.view()),
            Err(SelectionError::Shape(_))
        ));
    }
}
