//! Data-quality snapshot over the raw and clean tables.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: Option<i32>,
    pub max: Option<i32>,
    /// Rounded to two decimals; `0.0` when the clean table is empty.
    pub avg: f64,
    /// `0.0` when the clean table is empty.
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRange {
    pub oldest: Option<i32>,
    pub newest: Option<i32>,
}

/// Derived, read-only; recomputed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub raw_count: i64,
    pub clean_count: i64,
    pub dropped: i64,
    /// Percentage of raw rows absent from the clean table.
    pub drop_rate: f64,
    pub unique_model_count: i64,
    pub price: PriceStats,
    pub year_range: YearRange,
}

/// Price aggregates as returned by the database, before defaulting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceAggregates {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub avg: Option<f64>,
    pub median: Option<f64>,
}

impl QualityReport {
    /// Assemble a report from raw aggregate values.
    pub fn from_aggregates(
        raw_count: i64,
        clean_count: i64,
        unique_model_count: i64,
        price: PriceAggregates,
        year_range: YearRange,
    ) -> Self {
        let dropped = raw_count - clean_count;
        let drop_rate = if raw_count > 0 {
            dropped as f64 / raw_count as f64 * 100.0
        } else {
            0.0
        };

        Self {
            raw_count,
            clean_count,
            dropped,
            drop_rate,
            unique_model_count,
            price: PriceStats {
                min: price.min,
                max: price.max,
                avg: price.avg.map_or(0.0, round2),
                median: price.median.unwrap_or(0.0),
            },
            year_range,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
