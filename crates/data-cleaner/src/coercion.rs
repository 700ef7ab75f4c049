//! Text to Count Coercion

use crate::error::CleanError;
use listing_table::{replace, text};
use polars::prelude::*;
use tracing::debug;

/// Keep only the ASCII digits of `raw` and read them as an integer.
///
/// Empty input, or input without any digit, yields 0. The result is never
/// negative because the sign is stripped along with every other non-digit.
pub fn coerce_count(column: &str, raw: &str) -> Result<i64, CleanError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<i64>().map_err(|_| CleanError::Overflow {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Replace each named text column with its integer coercion. Columns that
/// are not text are rejected.
pub fn coerce_columns<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<(), CleanError> {
    for name in columns {
        let name = name.as_ref();
        let values = text(df, name)?
            .into_iter()
            .map(|cell| coerce_count(name, cell.unwrap_or("")))
            .collect::<Result<Vec<i64>, _>>()?;
        replace(df, Series::new(name.into(), values))?;
        debug!("Coerced {} to integers", name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_table::{ints, TableError};
    use proptest::prelude::*;

    #[test]
    fn test_strip_formatting() {
        assert_eq!(coerce_count("nrPreco", "R$ 1.200.000").unwrap(), 1_200_000);
        assert_eq!(coerce_count("nrArea(m2)", "85 m²").unwrap(), 85);
        assert_eq!(coerce_count("nrQuartos", "3 quartos").unwrap(), 3);
        assert_eq!(coerce_count("nrCondominio", "-450").unwrap(), 450);
    }

    #[test]
    fn test_empty_and_non_numeric_are_zero() {
        assert_eq!(coerce_count("nrIptu", "").unwrap(), 0);
        assert_eq!(coerce_count("nrIptu", "Não informado").unwrap(), 0);
        assert_eq!(coerce_count("nrIptu", "0").unwrap(), 0);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = coerce_count("nrPreco", "99999999999999999999999").unwrap_err();
        assert!(matches!(err, CleanError::Overflow { .. }));
    }

    #[test]
    fn test_coerce_columns_missing_cells() {
        let mut df = df!("nrVagas" => [Some("2 vagas"), None]).unwrap();
        coerce_columns(&mut df, &["nrVagas"]).unwrap();
        let values: Vec<i64> = ints(&df, "nrVagas").unwrap().into_no_null_iter().collect();
        assert_eq!(values, vec![2, 0]);
        assert!(coerce_columns(&mut df, &["nrSuites"]).is_err());
    }

    #[test]
    fn test_non_text_column_rejected() {
        let mut df = df!("nrVagas" => [Some("2 vagas")]).unwrap();
        coerce_columns(&mut df, &["nrVagas"]).unwrap();
        // A second pass would see integers, not scraped text.
        let err = coerce_columns(&mut df, &["nrVagas"]).unwrap_err();
        assert!(matches!(
            err,
            CleanError::Table(TableError::TypeMismatch { expected: "text", .. })
        ));
    }

    proptest! {
        #[test]
        fn test_coercion_is_total_and_non_negative(raw in "[^0-9]{0,8}[0-9]{0,15}[^0-9]{0,8}") {
            let value = coerce_count("col", &raw).unwrap();
            prop_assert!(value >= 0);
            if !raw.chars().any(|c| c.is_ascii_digit()) {
                prop_assert_eq!(value, 0);
            }
        }
    }
}
