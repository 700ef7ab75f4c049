//! Creation Date Decomposition

use chrono::{Datelike, NaiveDate, ParseError};

/// Accepted date layouts, day-first before ISO
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Calendar fields extracted from a listing date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarParts {
    pub month: i64,
    pub quarter: i64,
    pub iso_week: i64,
}

impl CalendarParts {
    pub fn from_date(date: NaiveDate) -> Self {
        let month = date.month() as i64;
        Self {
            month,
            quarter: (month - 1) / 3 + 1,
            iso_week: date.iso_week().week() as i64,
        }
    }
}

/// Parse a day-first listing date.
///
/// Returns `Ok(None)` for a missing value (empty, or the `"0"` fill marker)
/// and the last parse error for text that matches no accepted layout.
pub fn parse_listing_date(raw: &str) -> Result<Option<NaiveDate>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return Ok(None);
    }
    let mut last_error = None;
    for fmt in DATE_FORMATS {
        match NaiveDate::parse_from_str(raw, fmt) {
            Ok(date) => return Ok(Some(date)),
            Err(e) => last_error = Some(e),
        }
    }
    match last_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}
