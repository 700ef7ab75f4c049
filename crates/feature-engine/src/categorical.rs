//! Categorical One-Hot Expansion
//!
//! Amenity fields vary from listing to listing, so the column set is fixed in
//! two passes: `fit` enumerates every distinct value over the whole dataset,
//! then `apply` emits one binary column per value. Categories are ordered
//! lexicographically and the first one of each source column is dropped as the
//! reference level.

use crate::error::FeatureError;
use listing_table::{column_names, text, TableError};
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// One generated indicator column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyColumn {
    /// Output column name
    pub name: String,
    /// Source column
    pub source: String,
    /// Category the indicator is 1 for
    pub category: String,
}

/// Fixed one-hot schema learned from a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoricalSchema {
    dummies: Vec<DummyColumn>,
}

impl CategoricalSchema {
    /// Enumerate categories of `sources` across every row of `df`.
    ///
    /// Names in `reserved` are never produced; a colliding name gets the source
    /// column appended.
    pub fn fit<S: AsRef<str>>(
        df: &DataFrame,
        sources: &[S],
        prefix: &str,
        reserved: &[&str],
    ) -> Result<Self, FeatureError> {
        let mut taken: HashSet<String> = column_names(df).into_iter().collect();
        taken.extend(reserved.iter().map(|s| s.to_string()));

        let mut dummies = Vec::new();
        for source in sources {
            let source = source.as_ref();
            let categories: BTreeSet<&str> = text(df, source)?.into_iter().flatten().collect();

            for category in categories.into_iter().skip(1) {
                let mut name = format!("{}{}", prefix, category);
                if taken.contains(&name) {
                    name = format!("{}{}_{}", prefix, category, source);
                }
                if !taken.insert(name.clone()) {
                    return Err(TableError::DuplicateColumn(name).into());
                }
                dummies.push(DummyColumn {
                    name,
                    source: source.to_string(),
                    category: category.to_string(),
                });
            }
        }

        debug!("Categorical schema: {} columns from {} sources", dummies.len(), sources.len());
        Ok(Self { dummies })
    }

    /// Generated columns, in output order
    pub fn dummies(&self) -> &[DummyColumn] {
        &self.dummies
    }

    /// Build the indicator columns for `df`
    pub fn apply(&self, df: &DataFrame) -> Result<Vec<Series>, FeatureError> {
        self.dummies
            .iter()
            .map(|dummy| -> Result<Series, FeatureError> {
                let values: Vec<i64> = text(df, &dummy.source)?
                    .into_iter()
                    .map(|cell| i64::from(cell == Some(dummy.category.as_str())))
                    .collect();
                Ok(Series::new(dummy.name.as_str().into(), values))
            })
            .collect()
    }
}
