//! Cleaning Pass over Raw Listings

use crate::address::NeighborhoodExtractor;
use crate::coercion::coerce_columns;
use crate::config::CleaningConfig;
use crate::corrections::apply_corrections;
use crate::error::CleanError;
use listing_table::{column_names, rename_columns, replace, take_rows, text};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::info;

/// Counters collected while cleaning
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub rows_in: usize,
    pub duplicates_dropped: usize,
    pub cells_filled: usize,
    pub corrections_applied: usize,
    pub neighborhoods_missing: usize,
}

/// Applies the cleaning steps in a fixed order: rename, deduplicate, fill
/// missing cells, coerce counts, correct outliers, derive the neighborhood.
pub struct Cleaner {
    config: CleaningConfig,
    neighborhoods: NeighborhoodExtractor,
}

impl Cleaner {
    pub fn new(config: CleaningConfig) -> Result<Self, CleanError> {
        let neighborhoods = NeighborhoodExtractor::new(&config.neighborhood)?;
        Ok(Self {
            config,
            neighborhoods,
        })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a text-only raw frame
    pub fn clean(&self, mut df: DataFrame) -> Result<(DataFrame, CleaningReport), CleanError> {
        let mut report = CleaningReport {
            rows_in: df.height(),
            ..Default::default()
        };

        info!("Standardizing column names");
        self.rename(&mut df)?;

        info!("Dropping duplicates and filling missing values");
        let deduped = self.deduplicate(&df)?;
        report.duplicates_dropped = df.height() - deduped.height();
        df = deduped;
        report.cells_filled = fill_missing(&mut df, &self.config.fill_value)?;

        info!("Cleaning quantitative columns");
        coerce_columns(&mut df, &self.config.int_columns)?;

        info!("Correcting outliers");
        report.corrections_applied = apply_corrections(&mut df, &self.config.corrections)?;

        let hood = &self.config.neighborhood;
        let neighborhoods: Vec<Option<String>> = text(&df, &hood.address_column)?
            .into_iter()
            .map(|address| address.and_then(|a| self.neighborhoods.extract(a)))
            .collect();
        report.neighborhoods_missing = neighborhoods.iter().filter(|n| n.is_none()).count();
        replace(&mut df, Series::new(hood.output_column.as_str().into(), neighborhoods))?;

        info!(
            "Cleaning finished: {} rows in, {} duplicates dropped, {} cells filled, {} corrections",
            report.rows_in, report.duplicates_dropped, report.cells_filled, report.corrections_applied
        );
        Ok((df, report))
    }

    /// Apply the canonical rename mapping
    pub fn rename(&self, df: &mut DataFrame) -> Result<(), CleanError> {
        rename_columns(
            df,
            self.config
                .rename
                .iter()
                .map(|r| (r.from.as_str(), r.to.as_str())),
        )?;
        Ok(())
    }

    /// Keep the first row for every listing code, preserving arrival order
    pub fn deduplicate(&self, df: &DataFrame) -> Result<DataFrame, CleanError> {
        let keys = text(df, &self.config.dedup_key)?;
        let mut seen: HashSet<Option<&str>> = HashSet::with_capacity(keys.len());
        let keep: Vec<usize> = keys
            .into_iter()
            .enumerate()
            .filter(|(_, key)| seen.insert(*key))
            .map(|(i, _)| i)
            .collect();
        Ok(take_rows(df, &keep)?)
    }
}

/// Replace missing text cells with `value`; returns the number of cells filled
fn fill_missing(df: &mut DataFrame, value: &str) -> Result<usize, CleanError> {
    let mut filled = 0;
    for name in column_names(df) {
        let Ok(cells) = text(df, &name) else {
            continue;
        };
        if cells.null_count() == 0 {
            continue;
        }
        filled += cells.null_count();
        let values: Vec<String> = cells
            .into_iter()
            .map(|cell| cell.unwrap_or(value).to_string())
            .collect();
        replace(df, Series::new(name.as_str().into(), values))?;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_table::ints;
    use proptest::arbitrary::any;
    use proptest::prelude::*;

    fn int_values(df: &DataFrame, name: &str) -> Vec<i64> {
        ints(df, name).unwrap().into_no_null_iter().collect()
    }

    fn text_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        text(df, name).unwrap().into_iter().map(|v| v.map(str::to_string)).collect()
    }

    fn raw_frame() -> DataFrame {
        df!(
            "codigo_zapimoveis" => [Some("1"), Some("2"), Some("1")],
            "nrPreco" => [Some("R$ 3.500"), Some("R$ 500.000"), Some("R$ 9")],
            "condominio" => [Some("R$ 15.000"), None, Some("1")],
            "iptu" => [Some("R$ 17.000"), Some("R$ 80"), None],
            "endereco" => [
                Some("Rua X, 100 - Gonzaga, Santos"),
                Some("Boqueirão, Santos"),
                Some("Santos"),
            ],
            "floorSize" => [Some("11 m²"), Some("80 m²"), None],
            "numberOfRooms" => [Some("2 quartos"), Some("3"), None],
            "numberOfBathroomsTotal" => [Some("1"), Some("2"), None],
            "numberOfParkingSpaces" => [None, Some("1 vaga"), None],
            "floorLevel" => [Some("30"), Some("4"), None],
            "numberOfSuites" => [None, Some("1"), None]
        )
        .unwrap()
    }

    #[test]
    fn test_clean_end_to_end() {
        let cleaner = Cleaner::new(CleaningConfig::default()).unwrap();
        let (df, report) = cleaner.clean(raw_frame()).unwrap();

        assert_eq!(report.rows_in, 3);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(df.height(), 2);

        assert_eq!(int_values(&df, "nrPreco"), vec![350_000, 500_000]);
        assert_eq!(int_values(&df, "nrCondominio"), vec![15, 0]);
        assert_eq!(int_values(&df, "nrIptu"), vec![170, 80]);
        assert_eq!(int_values(&df, "nrArea(m2)"), vec![110, 80]);
        assert_eq!(int_values(&df, "nrAndar"), vec![3, 4]);
        assert_eq!(int_values(&df, "nrSuites"), vec![0, 1]);
        assert_eq!(
            text_values(&df, "bairro"),
            vec![Some("Gonzaga".to_string()), Some("Boqueirão".to_string())]
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let cleaner = Cleaner::new(CleaningConfig::default()).unwrap();
        let df = cleaner.deduplicate(&raw_frame()).unwrap();
        assert_eq!(
            text_values(&df, "codigo_zapimoveis"),
            vec![Some("1".to_string()), Some("2".to_string())]
        );
        assert_eq!(text(&df, "nrPreco").unwrap().get(0), Some("R$ 3.500"));
    }

    #[test]
    fn test_rename_twice_is_stable() {
        let cleaner = Cleaner::new(CleaningConfig::default()).unwrap();
        let mut df = raw_frame();
        cleaner.rename(&mut df).unwrap();
        let once = column_names(&df);
        cleaner.rename(&mut df).unwrap();
        assert_eq!(column_names(&df), once);
        assert!(once.contains(&"nrArea(m2)".to_string()));
    }

    #[test]
    fn test_missing_dedup_key() {
        let mut config = CleaningConfig::default();
        config.dedup_key = "id".to_string();
        let cleaner = Cleaner::new(config).unwrap();
        assert!(cleaner.clean(raw_frame()).is_err());
    }

    #[test]
    fn test_fill_counts_missing_cells() {
        let mut df = df!(
            "a" => [Some("x"), None, None],
            "b" => [1i64, 2, 3]
        )
        .unwrap();
        assert_eq!(fill_missing(&mut df, "0").unwrap(), 2);
        assert_eq!(text_values(&df, "a"), vec![Some("x".to_string()), Some("0".to_string()), Some("0".to_string())]);
    }

    proptest! {
        #[test]
        fn test_rename_idempotent_for_any_column_subset(keep in proptest::collection::vec(any::<bool>(), 11)) {
            let cleaner = Cleaner::new(CleaningConfig::default()).unwrap();
            let raw = raw_frame();
            let names: Vec<String> = column_names(&raw)
                .into_iter()
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|(n, _)| n)
                .collect();
            let mut df = raw.select(names.iter().map(String::as_str)).unwrap();

            cleaner.rename(&mut df).unwrap();
            let once = column_names(&df);
            cleaner.rename(&mut df).unwrap();
            prop_assert_eq!(column_names(&df), once);
        }
    }
}
