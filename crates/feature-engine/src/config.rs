//! Feature Engineering Configuration

use serde::{Deserialize, Serialize};

/// Train/test split settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of rows assigned to the test partition (rounded up)
    pub test_fraction: f64,
    /// Seed for the row permutation
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
        }
    }
}

/// Feature engineering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Leading raw columns kept as-is; every later column is a categorical amenity
    pub base_column_count: usize,
    /// Suite count, kept even when it sits among the amenity columns
    pub suite_column: String,
    /// Derived neighborhood column, expanded alongside the amenities
    pub neighborhood_column: String,
    /// Prefix of generated indicator columns
    pub dummy_prefix: String,
    /// Creation date column (day-first)
    pub date_column: String,
    pub split: SplitConfig,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            base_column_count: 14,
            suite_column: "nrSuites".to_string(),
            neighborhood_column: "bairro".to_string(),
            dummy_prefix: "d".to_string(),
            date_column: "dtCriacao".to_string(),
            split: SplitConfig::default(),
        }
    }
}
