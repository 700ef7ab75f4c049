//! Typed Column Access over `DataFrame`

use crate::error::TableError;
use polars::prelude::*;

fn series<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, TableError> {
    match df.get_column_index(name) {
        Some(i) => Ok(df.get_columns()[i].as_materialized_series()),
        None => Err(TableError::MissingColumn(name.to_string())),
    }
}

fn mismatch(name: &str, expected: &'static str, actual: &DataType) -> TableError {
    TableError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual: actual.to_string(),
    }
}

/// Column names in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().into_iter().map(|n| n.to_string()).collect()
}

/// Text cells of a column
pub fn text<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, TableError> {
    let s = series(df, name)?;
    match s.dtype() {
        DataType::String => Ok(s.str()?),
        other => Err(mismatch(name, "text", other)),
    }
}

/// Integer cells of a column
pub fn ints<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Int64Chunked, TableError> {
    let s = series(df, name)?;
    match s.dtype() {
        DataType::Int64 => Ok(s.i64()?),
        other => Err(mismatch(name, "int", other)),
    }
}

/// Column widened to floats. Text cells are parsed; missing or unparsable
/// cells are errors.
pub fn numeric(df: &DataFrame, name: &str) -> Result<Vec<f64>, TableError> {
    let s = series(df, name)?;
    let unparsable = |value: &str| TableError::ParseNumber {
        column: name.to_string(),
        value: value.to_string(),
    };
    match s.dtype() {
        DataType::String => s
            .str()?
            .into_iter()
            .map(|cell| {
                let raw = cell.unwrap_or("");
                raw.trim().parse::<f64>().map_err(|_| unparsable(raw))
            })
            .collect(),
        DataType::Int64 => s
            .i64()?
            .into_iter()
            .map(|v| v.map(|x| x as f64).ok_or_else(|| unparsable("")))
            .collect(),
        DataType::Float64 => s
            .f64()?
            .into_iter()
            .map(|v| v.ok_or_else(|| unparsable("")))
            .collect(),
        other => Err(mismatch(name, "numeric", other)),
    }
}

/// Append a column whose name must not exist yet
pub fn insert_new(df: &mut DataFrame, column: Series) -> Result<(), TableError> {
    if df.get_column_index(column.name().as_str()).is_some() {
        return Err(TableError::DuplicateColumn(column.name().to_string()));
    }
    df.with_column(column)?;
    Ok(())
}

/// Replace a column in place, or append it when absent
pub fn replace(df: &mut DataFrame, column: Series) -> Result<(), TableError> {
    df.with_column(column)?;
    Ok(())
}

/// Rename columns according to `(from, to)` pairs. Absent sources are ignored.
pub fn rename_columns<'a, I>(df: &mut DataFrame, mapping: I) -> Result<(), TableError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    for (from, to) in mapping {
        if from == to || df.get_column_index(from).is_none() {
            continue;
        }
        if df.get_column_index(to).is_some() {
            return Err(TableError::DuplicateColumn(to.to_string()));
        }
        df.rename(from, to.into())?;
    }
    Ok(())
}

/// New frame holding the given rows, in the given order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame, TableError> {
    let idx = IdxCa::from_vec("idx".into(), indices.iter().map(|&i| i as IdxSize).collect());
    Ok(df.take(&idx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> DataFrame {
        df!(
            "id" => [Some("a"), Some("b")],
            "price" => [100i64, 200]
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut df = sample();
        let err = insert_new(&mut df, Series::new("x".into(), &[1i64])).unwrap_err();
        assert!(matches!(err, TableError::Polars(_)));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut df = sample();
        replace(&mut df, Series::new("id".into(), &[1i64, 2])).unwrap();
        assert_eq!(column_names(&df), vec!["id", "price"]);
        assert_eq!(ints(&df, "id").unwrap().into_no_null_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_insert_existing_name_fails() {
        let mut df = sample();
        assert!(matches!(
            insert_new(&mut df, Series::new("price".into(), &[1i64, 2])),
            Err(TableError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn test_rename_is_idempotent() {
        let mut df = sample();
        let mapping = [("price", "nrPreco")];
        rename_columns(&mut df, mapping).unwrap();
        let once = column_names(&df);
        rename_columns(&mut df, mapping).unwrap();
        assert_eq!(column_names(&df), once);
        assert_eq!(once, vec!["id", "nrPreco"]);
    }

    #[test]
    fn test_rename_onto_existing_column_fails() {
        let mut df = sample();
        assert!(rename_columns(&mut df, [("price", "id")]).is_err());
    }

    #[test]
    fn test_typed_access_mismatch() {
        let df = sample();
        assert!(matches!(
            ints(&df, "id"),
            Err(TableError::TypeMismatch { expected: "int", .. })
        ));
        assert!(matches!(text(&df, "nope"), Err(TableError::MissingColumn(_))));
        assert_eq!(numeric(&df, "price").unwrap(), vec![100.0, 200.0]);
    }

    #[test]
    fn test_text_to_numeric() {
        let df = df!("x" => [Some("3"), Some(" 1.5 ")]).unwrap();
        assert_eq!(numeric(&df, "x").unwrap(), vec![3.0, 1.5]);

        let bad = df!("x" => [Some("abc")]).unwrap();
        assert!(matches!(numeric(&bad, "x"), Err(TableError::ParseNumber { .. })));

        let missing = df!("x" => [None::<&str>, Some("1")]).unwrap();
        assert!(numeric(&missing, "x").is_err());
    }

    proptest! {
        #[test]
        fn test_take_rows_follows_indices(indices in proptest::collection::vec(0usize..8, 0..20)) {
            let df = df!("v" => (0..8i64).collect::<Vec<_>>()).unwrap();
            let taken = take_rows(&df, &indices).unwrap();
            let values: Vec<i64> = ints(&taken, "v").unwrap().into_no_null_iter().collect();
            let expected: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
            prop_assert_eq!(values, expected);
        }
    }
}
