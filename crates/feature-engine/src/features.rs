//! Feature Table Assembly

use crate::calendar::{parse_listing_date, CalendarParts};
use crate::categorical::CategoricalSchema;
use crate::config::FeatureConfig;
use crate::derived::{add_amenity_count, add_indicators, add_ratios, fill_non_finite, INDICATORS};
use crate::error::FeatureError;
use crate::split::train_test_split;
use listing_table::{column_names, insert_new, replace, text, TableError};
use polars::prelude::*;
use tracing::{debug, info};

/// Column counts collected while engineering features
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureReport {
    pub rows: usize,
    pub amenity_sources: usize,
    pub amenity_columns: usize,
    pub neighborhood_columns: usize,
    pub missing_dates: usize,
    pub non_finite_filled: usize,
    pub output_columns: usize,
}

/// Builds the model-ready table from cleaned listings
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Engineer features over the whole cleaned dataset
    pub fn transform(&self, cleaned: &DataFrame) -> Result<(DataFrame, FeatureReport), FeatureError> {
        let cfg = &self.config;
        let names = column_names(cleaned);
        let boundary = cfg.base_column_count.min(names.len());

        // Everything after the leading base columns is an amenity, except the
        // suite count and the derived neighborhood.
        let amenities: Vec<&String> = names[boundary..]
            .iter()
            .filter(|n| **n != cfg.suite_column && **n != cfg.neighborhood_column)
            .collect();

        let mut kept: Vec<&str> = names[..boundary].iter().map(String::as_str).collect();
        if !kept.contains(&cfg.suite_column.as_str()) {
            kept.push(&cfg.suite_column);
        }
        if kept.contains(&cfg.neighborhood_column.as_str()) {
            return Err(TableError::DuplicateColumn(cfg.neighborhood_column.clone()).into());
        }
        kept.push(&cfg.neighborhood_column);
        for name in &kept {
            if cleaned.get_column_index(name).is_none() {
                return Err(TableError::MissingColumn(name.to_string()).into());
            }
        }
        let mut df = cleaned.select(kept.iter().copied()).map_err(TableError::from)?;

        info!("Expanding {} amenity columns", amenities.len());
        let reserved: Vec<&str> = INDICATORS.iter().map(|(_, name)| *name).collect();
        let amenity_schema = CategoricalSchema::fit(cleaned, &amenities, &cfg.dummy_prefix, &reserved)?;
        let amenity_names: Vec<String> = amenity_schema.dummies().iter().map(|d| d.name.clone()).collect();
        for series in amenity_schema.apply(cleaned)? {
            insert_new(&mut df, series)?;
        }

        let mut reserved_all = reserved.clone();
        reserved_all.extend(amenity_names.iter().map(String::as_str));
        let hood_schema = CategoricalSchema::fit(
            cleaned,
            &[cfg.neighborhood_column.as_str()],
            &cfg.dummy_prefix,
            &reserved_all,
        )?;
        let hood_names: Vec<String> = hood_schema.dummies().iter().map(|d| d.name.clone()).collect();
        for series in hood_schema.apply(cleaned)? {
            insert_new(&mut df, series)?;
        }

        // The amenity count covers every binary column: amenities,
        // neighborhoods and presence indicators.
        add_indicators(&mut df)?;
        let mut counted = amenity_names.clone();
        counted.extend(hood_names.iter().cloned());
        counted.extend(INDICATORS.iter().map(|(_, name)| name.to_string()));
        add_amenity_count(&mut df, &counted)?;
        add_ratios(&mut df)?;

        let missing_dates = self.add_calendar(&mut df)?;
        let non_finite_filled = fill_non_finite(&mut df)?;
        debug!("Replaced {} non-finite values with 0", non_finite_filled);

        let report = FeatureReport {
            rows: df.height(),
            amenity_sources: amenities.len(),
            amenity_columns: amenity_names.len(),
            neighborhood_columns: hood_names.len(),
            missing_dates,
            non_finite_filled,
            output_columns: df.width(),
        };
        info!(
            "Feature engineering finished: {} rows, {} columns ({} amenity, {} neighborhood indicators)",
            report.rows, report.output_columns, report.amenity_columns, report.neighborhood_columns
        );
        Ok((df, report))
    }

    /// Engineer features, then split into `(train, test)`
    pub fn transform_and_split(
        &self,
        cleaned: &DataFrame,
    ) -> Result<(DataFrame, DataFrame, FeatureReport), FeatureError> {
        let (df, report) = self.transform(cleaned)?;
        let (train, test) = train_test_split(&df, &self.config.split)?;
        Ok((train, test, report))
    }

    /// Normalize the date column to ISO text and append month, quarter and
    /// ISO week; returns the number of rows without a date
    fn add_calendar(&self, df: &mut DataFrame) -> Result<usize, FeatureError> {
        let name = &self.config.date_column;
        let mut dates: Vec<Option<String>> = Vec::with_capacity(df.height());
        let mut parts = Vec::with_capacity(df.height());
        for (row, cell) in text(df, name)?.into_iter().enumerate() {
            let raw = cell.unwrap_or("");
            let date = parse_listing_date(raw).map_err(|_| FeatureError::InvalidDate {
                row,
                value: raw.to_string(),
            })?;
            dates.push(date.map(|d| d.format("%Y-%m-%d").to_string()));
            parts.push(date.map(CalendarParts::from_date).unwrap_or_default());
        }
        let missing = dates.iter().filter(|d| d.is_none()).count();

        replace(df, Series::new(name.as_str().into(), dates))?;
        let month: Vec<i64> = parts.iter().map(|p| p.month).collect();
        let quarter: Vec<i64> = parts.iter().map(|p| p.quarter).collect();
        let week: Vec<i64> = parts.iter().map(|p| p.iso_week).collect();
        insert_new(df, Series::new(format!("{}_Mes", name).into(), month))?;
        insert_new(df, Series::new(format!("{}_Trimestre", name).into(), quarter))?;
        insert_new(df, Series::new(format!("{}_SemanaAno", name).into(), week))?;
        Ok(missing)
    }
}
