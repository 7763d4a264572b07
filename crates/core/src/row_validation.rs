//! Contract a cleaned table must satisfy before it may be persisted.
//!
//! A failed check is a reportable outcome: it is logged with the column
//! and condition that failed and reported as `false`, never raised.

use polars::prelude::*;

use crate::schema::{
    BUSINESS_COLUMNS, COL_ENGINE_SIZE, COL_MILEAGE, COL_MPG, COL_PRICE, COL_TAX, COL_YEAR,
    MIN_SANE_YEAR,
};
use crate::table::has_column;

const INT_COLUMNS: &[&str] = &[COL_YEAR, COL_PRICE, COL_MILEAGE, COL_TAX];
const FLOAT_COLUMNS: &[&str] = &[COL_MPG, COL_ENGINE_SIZE];

/// Check a cleaned table, short-circuiting on the first failure.
///
/// Checks run in order: required columns, nulls, column types, year
/// floor, non-negative price and mileage, non-empty.
pub fn validate_rows(df: &DataFrame) -> bool {
    let missing: Vec<&str> = BUSINESS_COLUMNS
        .iter()
        .copied()
        .filter(|c| !has_column(df, c))
        .collect();
    if !missing.is_empty() {
        tracing::error!(?missing, "Missing required columns");
        return false;
    }

    for name in BUSINESS_COLUMNS {
        let nulls = df.column(name).map_or(0, |c| c.null_count());
        if nulls > 0 {
            tracing::error!(column = name, nulls, "Column has null values");
            return false;
        }
    }

    for (columns, expected) in [
        (INT_COLUMNS, DataType::Int32),
        (FLOAT_COLUMNS, DataType::Float64),
    ] {
        for name in columns {
            let actual = df.column(name).ok().map(|c| c.dtype().clone());
            if actual.as_ref() != Some(&expected) {
                tracing::error!(column = name, ?expected, ?actual, "Column has wrong type");
                return false;
            }
        }
    }

    if min_below(df, COL_YEAR, MIN_SANE_YEAR) {
        tracing::error!(column = COL_YEAR, floor = MIN_SANE_YEAR, "Column has values below floor");
        return false;
    }
    if min_below(df, COL_PRICE, 0) {
        tracing::error!(column = COL_PRICE, "Column has negative values");
        return false;
    }
    if min_below(df, COL_MILEAGE, 0) {
        tracing::error!(column = COL_MILEAGE, "Column has negative values");
        return false;
    }

    if df.height() == 0 {
        tracing::error!("Table is empty after cleaning");
        return false;
    }

    tracing::info!(rows = df.height(), "Table passed all validation checks");
    true
}

fn min_below(df: &DataFrame, name: &str, floor: i32) -> bool {
    df.column(name)
        .ok()
        .and_then(|c| c.as_materialized_series().i32().ok().and_then(|ca| ca.min()))
        .is_some_and(|min| min < floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::Cleaner;
    use crate::extract::read_csv;

    const HEADER: &str = "model,year,price,transmission,mileage,fuelType,tax,mpg,engineSize";

    fn cleaned(rows: &[&str]) -> DataFrame {
        let mut data = format!("{HEADER}\n");
        for row in rows {
            data.push_str(row);
            data.push('\n');
        }
        Cleaner::default()
            .clean(&read_csv(data.as_bytes()).unwrap())
            .unwrap()
    }

    /// A table that skips the cleaner, for exercising individual checks.
    fn typed_table(year: i32, price: i32, mileage: i32) -> DataFrame {
        df!(
            "model" => ["x5"],
            "year" => [year],
            "price" => [price],
            "transmission" => ["manual"],
            "mileage" => [mileage],
            "fuel_type" => ["petrol"],
            "tax" => [145i32],
            "mpg" => [50.0f64],
            "engine_size" => [1.5f64]
        )
        .unwrap()
    }

    #[test]
    fn cleaned_table_passes() {
        assert!(validate_rows(&cleaned(&[
            "x5,2016,25000,Automatic,,Diesel,150,45.5,2.0"
        ])));
    }

    #[test]
    fn year_2013_passes_sanity_floor() {
        // Row validation only enforces the 1990 floor; 2014 is a business rule.
        assert!(validate_rows(&typed_table(2013, 10000, 0)));
    }

    #[test]
    fn year_below_floor_fails() {
        assert!(!validate_rows(&typed_table(1989, 10000, 0)));
    }

    #[test]
    fn negative_price_or_mileage_fails() {
        assert!(!validate_rows(&typed_table(2016, -1, 0)));
        assert!(!validate_rows(&typed_table(2016, 1, -1)));
        assert!(validate_rows(&typed_table(2016, 0, 0)));
    }

    #[test]
    fn empty_table_fails() {
        let df = cleaned(&["x5,2010,25000,Automatic,10,Diesel,150,45.5,2.0"]);
        assert_eq!(df.height(), 0);
        assert!(!validate_rows(&df));
    }

    #[test]
    fn nulls_fail() {
        let mut df = typed_table(2016, 100, 0);
        df.with_column(Series::new("tax".into(), [None::<i32>]))
            .unwrap();
        assert!(!validate_rows(&df));
    }

    #[test]
    fn wrong_type_fails() {
        let mut df = typed_table(2016, 100, 0);
        df.with_column(Series::new("mpg".into(), [50i32])).unwrap();
        assert!(!validate_rows(&df));
    }

    #[test]
    fn uncleaned_table_fails_on_column_names() {
        let data = format!("{HEADER}\nx5,2016,25000,Automatic,10,Diesel,150,45.5,2.0\n");
        assert!(!validate_rows(&read_csv(data.as_bytes()).unwrap()));
    }
}
