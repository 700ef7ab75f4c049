//! K-Fold Cross-Validation Splits

use crate::SelectionError;

/// Contiguous, unshuffled K-fold partitioning. The first `n % k` folds hold
/// one extra sample.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    folds: usize,
}

impl KFold {
    pub fn new(folds: usize) -> Result<Self, SelectionError> {
        if folds < 2 {
            return Err(SelectionError::InvalidFolds(folds));
        }
        Ok(Self { folds })
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// `(train, validation)` row indices for each fold
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>, SelectionError> {
        if n_samples < self.folds {
            return Err(SelectionError::TooFewSamples {
                samples: n_samples,
                folds: self.folds,
            });
        }
        let base = n_samples / self.folds;
        let extra = n_samples % self.folds;

        let mut start = 0;
        let mut splits = Vec::with_capacity(self.folds);
        for fold in 0..self.folds {
            let size = base + usize::from(fold < extra);
            let end = start + size;
            let validation: Vec<usize> = (start..end).collect();
            let train: Vec<usize> = (0..start).chain(end..n_samples).collect();
            splits.push((train, validation));
            start = end;
        }
        Ok(splits)
    }
}
