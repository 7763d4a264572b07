//! Column contract shared by extraction, cleaning, validation and loading.
//!
//! Ingestion-side names (`fuelType`, `engineSize`) are what the CSV
//! extract carries; canonical names (`fuel_type`, `engine_size`) are what
//! the cleaner produces and the clean table stores.

use polars::prelude::DataType;

// ---------------------------------------------------------------------------
// Input contract
// ---------------------------------------------------------------------------

/// Columns every input file must provide, spelled as the extract spells them.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "model",
    "year",
    "price",
    "transmission",
    "mileage",
    "fuelType",
    "tax",
    "mpg",
    "engineSize",
];

/// Ingestion-side name to canonical business name. Unlisted columns keep
/// their name.
pub const COLUMN_RENAMES: &[(&str, &str)] =
    &[("fuelType", "fuel_type"), ("engineSize", "engine_size")];

// ---------------------------------------------------------------------------
// Canonical (post-rename) contract
// ---------------------------------------------------------------------------

pub const COL_MODEL: &str = "model";
pub const COL_YEAR: &str = "year";
pub const COL_PRICE: &str = "price";
pub const COL_TRANSMISSION: &str = "transmission";
pub const COL_MILEAGE: &str = "mileage";
pub const COL_FUEL_TYPE: &str = "fuel_type";
pub const COL_TAX: &str = "tax";
pub const COL_MPG: &str = "mpg";
pub const COL_ENGINE_SIZE: &str = "engine_size";

/// Business columns of a clean row, in table order.
pub const BUSINESS_COLUMNS: &[&str] = &[
    COL_MODEL,
    COL_YEAR,
    COL_PRICE,
    COL_TRANSMISSION,
    COL_MILEAGE,
    COL_FUEL_TYPE,
    COL_TAX,
    COL_MPG,
    COL_ENGINE_SIZE,
];

/// Numeric storage class of a coerced column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Int,
    Float,
}

impl NumericKind {
    /// Dataframe type a column of this kind is cast to.
    pub fn dtype(self) -> DataType {
        match self {
            NumericKind::Int => DataType::Int32,
            NumericKind::Float => DataType::Float64,
        }
    }
}

/// Declared target type for each coerced column.
pub const COLUMN_TYPES: &[(&str, NumericKind)] = &[
    (COL_YEAR, NumericKind::Int),
    (COL_PRICE, NumericKind::Int),
    (COL_MILEAGE, NumericKind::Int),
    (COL_TAX, NumericKind::Int),
    (COL_MPG, NumericKind::Float),
    (COL_ENGINE_SIZE, NumericKind::Float),
];

/// Free-text columns that are trimmed and lower-cased.
pub const TEXT_COLUMNS: &[&str] = &[COL_MODEL, COL_TRANSMISSION, COL_FUEL_TYPE];

/// A row missing any of these is dropped; no fallback value is meaningful.
pub const CRITICAL_COLUMNS: &[&str] = &[COL_MODEL, COL_YEAR, COL_PRICE];

/// Numeric columns whose nulls are resolved by the numeric null policy.
pub const FILLABLE_COLUMNS: &[&str] = &[COL_MILEAGE, COL_TAX, COL_MPG, COL_ENGINE_SIZE];

// ---------------------------------------------------------------------------
// Range rules
// ---------------------------------------------------------------------------

/// Sanity floor enforced by row validation.
pub const MIN_SANE_YEAR: i32 = 1990;

/// Default inclusion floor applied by the business-rule filter.
pub const DEFAULT_MIN_MODEL_YEAR: i32 = 2014;

/// Look up the canonical name for an ingestion-side column.
pub fn canonical_name(name: &str) -> &str {
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Declared target type for a canonical column, if it is coerced.
pub fn declared_type(name: &str) -> Option<NumericKind> {
    COLUMN_TYPES
        .iter()
        .find(|(col, _)| *col == name)
        .map(|(_, dtype)| *dtype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renames_only_mapped_columns() {
        assert_eq!(canonical_name("fuelType"), "fuel_type");
        assert_eq!(canonical_name("engineSize"), "engine_size");
        assert_eq!(canonical_name("model"), "model");
        assert_eq!(canonical_name("colour"), "colour");
    }

    #[test]
    fn every_business_column_is_reachable_from_required_columns() {
        for col in BUSINESS_COLUMNS {
            assert!(
                REQUIRED_COLUMNS.iter().any(|r| canonical_name(r) == *col),
                "{col} has no ingestion-side source"
            );
        }
    }

    #[test]
    fn text_columns_have_no_declared_type() {
        for col in TEXT_COLUMNS {
            assert_eq!(declared_type(col), None);
        }
        assert_eq!(declared_type(COL_MPG), Some(NumericKind::Float));
        assert_eq!(declared_type(COL_TAX), Some(NumericKind::Int));
        assert_eq!(NumericKind::Int.dtype(), DataType::Int32);
    }
}
