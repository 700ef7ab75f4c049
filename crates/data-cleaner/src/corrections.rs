//! Audited Outlier Corrections
//!
//! Literal value substitutions found by manual review of the listing data.
//! They fix known data-entry errors in this source and are not a general
//! outlier detector. Rules live in an ordered table so each one can be
//! reviewed and tested on its own.

use crate::error::CleanError;
use listing_table::{ints, replace};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Condition a cell must meet for a rule to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Cell equals the value exactly
    Equals(i64),
    /// Cell is strictly greater than the value
    GreaterThan(i64),
}

impl Predicate {
    pub fn matches(&self, value: i64) -> bool {
        match *self {
            Predicate::Equals(v) => value == v,
            Predicate::GreaterThan(v) => value > v,
        }
    }
}

/// New value computed for a matching cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Substitute a fixed value
    Replace(i64),
    /// Integer division, truncating toward zero
    Divide(i64),
}

impl Adjustment {
    pub fn apply(&self, value: i64) -> i64 {
        match *self {
            Adjustment::Replace(v) => v,
            Adjustment::Divide(d) => value / d,
        }
    }
}

/// A single `(column, predicate, adjustment)` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    pub column: String,
    pub predicate: Predicate,
    pub adjustment: Adjustment,
}

impl CorrectionRule {
    pub fn new(column: &str, predicate: Predicate, adjustment: Adjustment) -> Self {
        Self {
            column: column.to_string(),
            predicate,
            adjustment,
        }
    }

    /// Shorthand for an exact substitution
    pub fn replace(column: &str, from: i64, to: i64) -> Self {
        Self::new(column, Predicate::Equals(from), Adjustment::Replace(to))
    }

    fn validate(&self) -> Result<(), CleanError> {
        if let Adjustment::Divide(d) = self.adjustment {
            if d <= 0 {
                return Err(CleanError::InvalidRule {
                    column: self.column.clone(),
                    reason: format!("divisor must be positive, got {}", d),
                });
            }
        }
        Ok(())
    }
}

/// Corrections for the Santos listing dataset, in application order
pub fn default_corrections() -> Vec<CorrectionRule> {
    vec![
        CorrectionRule::replace("nrPreco", 3_500, 350_000),
        CorrectionRule::replace("nrPreco", 120_000_000, 1_200_000),
        CorrectionRule::replace("nrPreco", 399_000_000, 399_000),
        CorrectionRule::new(
            "nrCondominio",
            Predicate::GreaterThan(10_000),
            Adjustment::Divide(1_000),
        ),
        CorrectionRule::replace("nrIptu", 400_000, 400),
        CorrectionRule::replace("nrIptu", 120_000, 120),
        CorrectionRule::replace("nrIptu", 17_000, 170),
        CorrectionRule::new("nrAndar", Predicate::GreaterThan(25), Adjustment::Divide(10)),
        CorrectionRule::replace("nrArea(m2)", 11, 110),
    ]
}

/// Apply `rules` to the integer columns of `df`; returns the number of
/// corrected cells.
///
/// Every predicate is evaluated against the value the cell had before any
/// rule ran, and the first matching rule for that column wins, so a corrected
/// value is never corrected again.
pub fn apply_corrections(df: &mut DataFrame, rules: &[CorrectionRule]) -> Result<usize, CleanError> {
    for rule in rules {
        rule.validate()?;
    }

    let mut columns: Vec<&str> = Vec::new();
    for rule in rules {
        if !columns.contains(&rule.column.as_str()) {
            columns.push(&rule.column);
        }
    }

    let mut corrected = 0;
    for name in columns {
        let column_rules: Vec<&CorrectionRule> = rules.iter().filter(|r| r.column == name).collect();
        let mut changed = 0;
        let updated: Vec<Option<i64>> = ints(df, name)?
            .into_iter()
            .map(|cell| {
                cell.map(|value| match column_rules.iter().find(|r| r.predicate.matches(value)) {
                    Some(rule) => {
                        changed += 1;
                        rule.adjustment.apply(value)
                    }
                    None => value,
                })
            })
            .collect();
        replace(df, Series::new(name.into(), updated))?;
        debug!("Corrected {} cells in {}", changed, name);
        corrected += changed;
    }

    info!("Applied {} outlier corrections", corrected);
    Ok(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(df: &DataFrame, name: &str) -> Vec<i64> {
        ints(df, name).unwrap().into_no_null_iter().collect()
    }

    fn frame_with(name: &str, values: Vec<i64>) -> DataFrame {
        DataFrame::new(vec![Series::new(name.into(), values).into()]).unwrap()
    }

    #[test]
    fn test_price_substitutions() {
        let mut df = frame_with("nrPreco", vec![3_500, 120_000_000, 399_000_000, 500_000]);
        let n = apply_corrections(&mut df, &default_corrections()[..3]).unwrap();
        assert_eq!(n, 3);
        assert_eq!(values(&df, "nrPreco"), vec![350_000, 1_200_000, 399_000, 500_000]);
    }

    #[test]
    fn test_condo_fee_truncating_division() {
        // Values over 10000 are divided by 1000 and truncated toward zero.
        let rules = default_corrections();
        let mut df = frame_with("nrCondominio", vec![15_000, 10_000, 12_345, 800]);
        apply_corrections(&mut df, &rules[3..4]).unwrap();
        assert_eq!(values(&df, "nrCondominio"), vec![15, 10_000, 12, 800]);
    }

    #[test]
    fn test_floor_level_and_area() {
        let rules = default_corrections();
        let mut df = df!(
            "nrAndar" => [30i64, 25, 125],
            "nrArea(m2)" => [11i64, 110, 12]
        )
        .unwrap();
        apply_corrections(&mut df, &rules[7..]).unwrap();
        assert_eq!(values(&df, "nrAndar"), vec![3, 25, 12]);
        assert_eq!(values(&df, "nrArea(m2)"), vec![110, 110, 12]);
    }

    #[test]
    fn test_rules_never_chain() {
        let rules = vec![
            CorrectionRule::replace("x", 1, 2),
            CorrectionRule::replace("x", 2, 3),
        ];
        let mut df = frame_with("x", vec![1, 2]);
        apply_corrections(&mut df, &rules).unwrap();
        assert_eq!(values(&df, "x"), vec![2, 3]);
    }

    #[test]
    fn test_invalid_divisor_rejected() {
        let rules = vec![CorrectionRule::new("x", Predicate::GreaterThan(0), Adjustment::Divide(0))];
        let mut df = frame_with("x", vec![5]);
        assert!(matches!(
            apply_corrections(&mut df, &rules),
            Err(CleanError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut df = frame_with("nrPreco", vec![1]);
        assert!(apply_corrections(&mut df, &default_corrections()).is_err());
    }
}
