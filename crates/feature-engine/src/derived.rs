//! Derived Indicator and Ratio Columns

use crate::error::FeatureError;
use listing_table::{column_names, insert_new, ints, numeric, replace};
use polars::prelude::*;

/// `(source, indicator)` pairs; the indicator is 1 when the source is positive
pub const INDICATORS: [(&str, &str); 6] = [
    ("nrCondominio", "dCondominio"),
    ("nrIptu", "dIptu"),
    ("nrQuartos", "dQuartos"),
    ("nrVagas", "dVagas"),
    ("nrAndar", "dAndar"),
    ("nrSuites", "dSuites"),
];

pub const AMENITY_COUNT: &str = "nrQtdComodidades";

/// Integer cells; a missing count reads as 0, as it does after cleaning
fn int_values(df: &DataFrame, name: &str) -> Result<Vec<i64>, FeatureError> {
    Ok(ints(df, name)?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

/// Row-wise sum of `columns`, failing on the first row that overflows
fn checked_sum(output: &str, columns: &[&[i64]], rows: usize) -> Result<Vec<i64>, FeatureError> {
    (0..rows)
        .map(|row| {
            columns
                .iter()
                .try_fold(0i64, |acc, values| acc.checked_add(values[row]))
                .ok_or_else(|| FeatureError::Overflow {
                    column: output.to_string(),
                    row,
                })
        })
        .collect()
}

/// Append the presence indicators of `INDICATORS`
pub fn add_indicators(df: &mut DataFrame) -> Result<(), FeatureError> {
    for (source, name) in INDICATORS {
        let values: Vec<i64> = int_values(df, source)?.into_iter().map(|v| i64::from(v > 0)).collect();
        insert_new(df, Series::new(name.into(), values))?;
    }
    Ok(())
}

/// Append the total of the given binary columns as the amenity count
pub fn add_amenity_count<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<(), FeatureError> {
    let values = columns
        .iter()
        .map(|name| int_values(df, name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let slices: Vec<&[i64]> = values.iter().map(Vec::as_slice).collect();
    let total = checked_sum(AMENITY_COUNT, &slices, df.height())?;
    insert_new(df, Series::new(AMENITY_COUNT.into(), total))?;
    Ok(())
}

/// Append cost, room and per-area ratios.
///
/// Divisions by a zero floor area produce non-finite values that
/// `fill_non_finite` later resolves to 0.
pub fn add_ratios(df: &mut DataFrame) -> Result<(), FeatureError> {
    let rows = df.height();
    let condo = int_values(df, "nrCondominio")?;
    let iptu = int_values(df, "nrIptu")?;
    let area = numeric(df, "nrArea(m2)")?;
    let rooms = int_values(df, "nrQuartos")?;
    let baths = int_values(df, "nrBanheiros")?;
    let suites = int_values(df, "nrSuites")?;
    let parking = int_values(df, "nrVagas")?;
    let floor = int_values(df, "nrAndar")?;

    let fixed = checked_sum("nrPrecoFixo", &[condo.as_slice(), iptu.as_slice()], rows)?;
    let rooms_total = checked_sum(
        "nrComodos",
        &[baths.as_slice(), rooms.as_slice(), suites.as_slice()],
        rows,
    )?;

    let columns = vec![
        Series::new("nrPrecoFixo".into(), fixed.clone()),
        per("nrPrecoFixo_m2", &fixed, &area),
        per("nrIptu_m2", &iptu, &area),
        per("nrCondominio_m2", &condo, &area),
        Series::new("nrComodos".into(), rooms_total.clone()),
        per("nrComodos_m2", &rooms_total, &area),
        ratio_or_raw("nrBanheiros_Suites", &baths, &suites),
        ratio_or_raw("nrVagas_Quartos", &parking, &rooms),
        ratio_or_raw("nrCondominio_Andar", &condo, &floor),
    ];
    for column in columns {
        insert_new(df, column)?;
    }
    Ok(())
}

fn per(name: &str, values: &[i64], area: &[f64]) -> Series {
    let ratios: Vec<f64> = values.iter().zip(area).map(|(&v, &a)| v as f64 / a).collect();
    Series::new(name.into(), ratios)
}

/// `num / den` when `den >= 1`, else `num` unchanged
fn ratio_or_raw(name: &str, num: &[i64], den: &[i64]) -> Series {
    let ratios: Vec<f64> = num
        .iter()
        .zip(den)
        .map(|(&n, &d)| if d >= 1 { n as f64 / d as f64 } else { n as f64 })
        .collect();
    Series::new(name.into(), ratios)
}

/// Replace NaN and infinities in every float column with 0; returns the
/// number of cells replaced
pub fn fill_non_finite(df: &mut DataFrame) -> Result<usize, FeatureError> {
    let mut filled = 0;
    for name in column_names(df) {
        if df.column(&name).map(|c| c.dtype() != &DataType::Float64).unwrap_or(true) {
            continue;
        }
        let mut values = numeric(df, &name)?;
        let before = filled;
        for v in values.iter_mut().filter(|v| !v.is_finite()) {
            *v = 0.0;
            filled += 1;
        }
        if filled > before {
            replace(df, Series::new(name.as_str().into(), values))?;
        }
    }
    Ok(filled)
}
