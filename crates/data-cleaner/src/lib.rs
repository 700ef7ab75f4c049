//! Listing Data Cleaning
//!
//! Turns raw, text-only scraped listings into typed records: canonical column
//! names, one row per listing code, non-negative integer counts, audited
//! outlier corrections and a neighborhood derived from the address.

mod address;
mod cleaner;
mod coercion;
mod config;
mod corrections;
mod error;

pub use address::NeighborhoodExtractor;
pub use cleaner::{Cleaner, CleaningReport};
pub use coercion::{coerce_count, coerce_columns};
pub use config::{CleaningConfig, NeighborhoodConfig, RenameRule, Substitution};
pub use corrections::{apply_corrections, default_corrections, Adjustment, CorrectionRule, Predicate};
pub use error::CleanError;
