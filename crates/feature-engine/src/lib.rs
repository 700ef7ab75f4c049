//! Feature Engineering Engine
//!
//! Turns cleaned listings into a fully numeric, model-ready table and splits
//! it into reproducible train/test partitions.

mod calendar;
mod categorical;
mod config;
mod derived;
mod error;
mod features;
mod split;

pub use calendar::{parse_listing_date, CalendarParts};
pub use categorical::{CategoricalSchema, DummyColumn};
pub use config::{FeatureConfig, SplitConfig};
pub use derived::{add_amenity_count, add_indicators, add_ratios, fill_non_finite, AMENITY_COUNT, INDICATORS};
pub use error::FeatureError;
pub use features::{FeatureEngineer, FeatureReport};
pub use split::{split_indices, train_test_split};
