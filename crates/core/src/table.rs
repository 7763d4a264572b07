//! Column lookups on a polars [`DataFrame`] that report structural
//! problems as [`CoreError::MalformedTable`].

use polars::prelude::*;

use crate::error::CoreError;

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// The named column as a series, or `MalformedTable` when it is absent.
pub fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, CoreError> {
    if !has_column(df, name) {
        return Err(CoreError::MalformedTable(format!("missing column '{name}'")));
    }
    Ok(df.column(name)?.as_materialized_series())
}

/// Fail with `MalformedTable` unless `series` has type `expected`.
pub fn expect_dtype(series: &Series, expected: &DataType) -> Result<(), CoreError> {
    if series.dtype() == expected {
        Ok(())
    } else {
        Err(CoreError::MalformedTable(format!(
            "column '{}' is {}, expected {expected}",
            series.name(),
            series.dtype()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> DataFrame {
        df!("model" => ["x5"], "year" => [2016i32]).unwrap()
    }

    #[test]
    fn lookups_by_name() {
        let df = sample();
        assert_eq!(column_names(&df), vec!["model", "year"]);
        assert!(has_column(&df, "year"));
        assert!(!has_column(&df, "price"));
        assert_eq!(require(&df, "year").unwrap().len(), 1);
    }

    #[test]
    fn missing_column_is_malformed_table() {
        assert_matches!(require(&sample(), "price"), Err(CoreError::MalformedTable(_)));
    }

    #[test]
    fn dtype_mismatch_is_malformed_table() {
        let df = sample();
        let year = require(&df, "year").unwrap();
        assert!(expect_dtype(year, &DataType::Int32).is_ok());
        assert_matches!(
            expect_dtype(year, &DataType::Float64),
            Err(CoreError::MalformedTable(_))
        );
    }
}
