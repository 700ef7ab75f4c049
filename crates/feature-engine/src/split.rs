//! Seeded Train/Test Split

use crate::config::SplitConfig;
use crate::error::FeatureError;
use listing_table::take_rows;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Row indices of the `(train, test)` partitions for `n` rows.
///
/// The test partition holds `ceil(n * test_fraction)` rows taken from the
/// front of a seeded permutation; the rest go to training.
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>), FeatureError> {
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(FeatureError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {}",
            config.test_fraction
        )));
    }
    let n_test = (n as f64 * config.test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(FeatureError::InvalidSplit(format!(
            "{} rows cannot be split with test fraction {}",
            n, config.test_fraction
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    order.shuffle(&mut rng);

    let test = order[..n_test].to_vec();
    let train = order[n_test..].to_vec();
    Ok((train, test))
}

/// Split `df` into `(train, test)` frames
pub fn train_test_split(df: &DataFrame, config: &SplitConfig) -> Result<(DataFrame, DataFrame), FeatureError> {
    let (train, test) = split_indices(df.height(), config)?;
    info!(
        "Split {} rows into {} train / {} test (seed {})",
        df.height(),
        train.len(),
        test.len(),
        config.seed
    );
    Ok((take_rows(df, &train)?, take_rows(df, &test)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::arbitrary::any;
    use proptest::prelude::*;

    #[test]
    fn test_seventy_thirty() {
        let (train, test) = split_indices(100, &SplitConfig::default()).unwrap();
        assert_eq!(train.len(), 70);
        assert_eq!(test.len(), 30);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_test_size_rounds_up() {
        let (train, test) = split_indices(11, &SplitConfig::default()).unwrap();
        assert_eq!(test.len(), 4);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_degenerate_splits_rejected() {
        assert!(split_indices(1, &SplitConfig::default()).is_err());
        assert!(split_indices(0, &SplitConfig::default()).is_err());
        let config = SplitConfig {
            test_fraction: 1.0,
            seed: 42,
        };
        assert!(split_indices(10, &config).is_err());
    }

    #[test]
    fn test_seed_changes_partition() {
        let a = split_indices(50, &SplitConfig::default()).unwrap();
        let b = split_indices(50, &SplitConfig { seed: 7, ..Default::default() }).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_frame_split_keeps_every_row_once() {
        let df = df!("id" => (0..20i64).collect::<Vec<_>>()).unwrap();
        let (train, test) = train_test_split(&df, &SplitConfig::default()).unwrap();
        assert_eq!((train.height(), test.height()), (14, 6));

        let mut ids: Vec<i64> = train
            .vstack(&test)
            .unwrap()
            .column("id")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn test_split_is_reproducible(n in 2usize..500, seed in any::<u64>()) {
            let config = SplitConfig { test_fraction: 0.3, seed };
            let first = split_indices(n, &config).unwrap();
            let second = split_indices(n, &config).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
