//! Deterministic cleaning pipeline for extracted sales data.
//!
//! Stages run in a fixed order and each applies to every row:
//!
//! 1. rename ingestion-side columns to canonical names
//! 2. cast declared numeric columns (unparseable cells become null,
//!    fractional integers are truncated)
//! 3. trim and lower-case the free-text columns
//! 4. drop rows missing a critical column, then resolve numeric nulls
//! 5. keep only rows passing the business rules
//!
//! Per-row data problems are filtered or defaulted, never raised. Only a
//! structurally broken table (missing or mistyped columns) is an error.

use std::str::FromStr;

use polars::prelude::*;

use crate::error::CoreError;
use crate::schema::{
    canonical_name, declared_type, NumericKind, COLUMN_TYPES, COL_MILEAGE, COL_PRICE, COL_YEAR,
    CRITICAL_COLUMNS, DEFAULT_MIN_MODEL_YEAR, FILLABLE_COLUMNS, TEXT_COLUMNS,
};
use crate::table::{column_names, expect_dtype, has_column, require};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How nulls left in mileage, tax, mpg and engine size are resolved.
///
/// Zero is a usable default for an unknown cost or efficiency figure but
/// it is not the same as "unknown"; `DropRow` keeps only fully observed
/// rows instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericNullPolicy {
    #[default]
    FillZero,
    DropRow,
}

impl FromStr for NumericNullPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "fill_zero" => Ok(Self::FillZero),
            "drop" | "drop_row" => Ok(Self::DropRow),
            other => Err(CoreError::Validation(format!(
                "Invalid numeric null policy '{other}'. Must be one of: zero, drop"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanerConfig {
    pub numeric_nulls: NumericNullPolicy,
    /// Oldest model year admitted by the business-rule filter.
    pub min_model_year: i32,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            numeric_nulls: NumericNullPolicy::FillZero,
            min_model_year: DEFAULT_MIN_MODEL_YEAR,
        }
    }
}

// ---------------------------------------------------------------------------
// Cleaner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Run every stage over a copy of `raw` and return the clean table.
    pub fn clean(&self, raw: &DataFrame) -> Result<DataFrame, CoreError> {
        tracing::info!(rows = raw.height(), "Starting data cleaning");

        let df = rename_columns(raw.clone())?;
        let df = coerce_types(df)?;
        let df = normalize_text(df)?;
        let df = self.resolve_nulls(df)?;
        let df = self.apply_business_rules(df)?;

        tracing::info!(
            rows_in = raw.height(),
            rows_out = df.height(),
            "Data cleaning completed"
        );
        Ok(df)
    }

    fn resolve_nulls(&self, df: DataFrame) -> Result<DataFrame, CoreError> {
        for name in CRITICAL_COLUMNS {
            require(&df, name)?;
        }
        let before = df.height();
        let df = df.lazy().filter(all_present(CRITICAL_COLUMNS)).collect()?;
        tracing::debug!(
            dropped = before - df.height(),
            "Dropped rows missing critical columns"
        );

        let present: Vec<&str> = FILLABLE_COLUMNS
            .iter()
            .copied()
            .filter(|name| has_column(&df, name))
            .collect();

        let df = match self.config.numeric_nulls {
            NumericNullPolicy::FillZero => {
                let mut fills = Vec::with_capacity(present.len());
                for name in &present {
                    let nulls = df.column(name)?.null_count();
                    if nulls > 0 {
                        tracing::debug!(column = name, nulls, "Filled nulls with 0");
                    }
                    let zero = match declared_type(name) {
                        Some(NumericKind::Float) => lit(0.0),
                        _ => lit(0),
                    };
                    fills.push(col(*name).fill_null(zero));
                }
                df.lazy().with_columns(fills).collect()?
            }
            NumericNullPolicy::DropRow => {
                let before = df.height();
                let df = if present.is_empty() {
                    df
                } else {
                    df.lazy().filter(all_present(&present)).collect()?
                };
                tracing::debug!(
                    dropped = before - df.height(),
                    "Dropped rows with numeric nulls"
                );
                df
            }
        };

        tracing::info!(remaining = df.height(), "Handled null values");
        Ok(df)
    }

    fn apply_business_rules(&self, df: DataFrame) -> Result<DataFrame, CoreError> {
        for name in [COL_PRICE, COL_YEAR, COL_MILEAGE] {
            expect_dtype(require(&df, name)?, &DataType::Int32)?;
        }

        let before = df.height();
        let keep = col(COL_PRICE)
            .gt(lit(0))
            .and(col(COL_YEAR).gt_eq(lit(self.config.min_model_year)))
            .and(col(COL_MILEAGE).gt_eq(lit(0)));
        let df = df.lazy().filter(keep).collect()?;

        tracing::info!(
            dropped = before - df.height(),
            remaining = df.height(),
            "Applied business rules"
        );
        Ok(df)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

pub(crate) fn rename_columns(mut df: DataFrame) -> Result<DataFrame, CoreError> {
    for from in column_names(&df) {
        let to = canonical_name(&from);
        if to == from {
            continue;
        }
        if has_column(&df, to) {
            return Err(CoreError::MalformedTable(format!(
                "cannot rename '{from}': column '{to}' already exists"
            )));
        }
        df.rename(&from, to.into())?;
    }
    tracing::debug!("Columns renamed to canonical names");
    Ok(df)
}

/// Cast each declared column through `Float64` so integral spellings such
/// as `"2016.0"` or `"1e3"` survive. Casts are non-strict.
pub(crate) fn coerce_types(df: DataFrame) -> Result<DataFrame, CoreError> {
    let mut casts = Vec::new();
    for (name, kind) in COLUMN_TYPES {
        if !has_column(&df, name) {
            continue;
        }
        let mut expr = col(*name);
        if df.column(name)?.dtype() == &DataType::String {
            expr = expr.str().strip_chars(lit(NULL));
        }
        expr = expr.cast(DataType::Float64);
        if *kind == NumericKind::Int {
            expr = expr.cast(DataType::Int32);
        }
        casts.push(expr);
    }
    if casts.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(casts).collect()?)
}

fn normalize_text(df: DataFrame) -> Result<DataFrame, CoreError> {
    let mut exprs = Vec::new();
    for name in TEXT_COLUMNS {
        if !has_column(&df, name) {
            continue;
        }
        expect_dtype(require(&df, name)?, &DataType::String)?;
        let normalized = col(*name).str().strip_chars(lit(NULL)).str().to_lowercase();
        exprs.push(
            when(normalized.clone().eq(lit("")))
                .then(lit(NULL).cast(DataType::String))
                .otherwise(normalized)
                .alias(*name),
        );
    }
    if exprs.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(exprs).collect()?)
}

/// True where none of `names` is null.
fn all_present(names: &[&str]) -> Expr {
    names
        .iter()
        .map(|name| col(*name).is_not_null())
        .reduce(|acc, e| acc.and(e))
        .unwrap_or_else(|| lit(true))
}
