//! Stored rows of the raw and clean sales tables.

use carsales_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `raw_car_sales`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RawSaleRow {
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<i32>,
    pub transmission: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub tax: Option<i32>,
    pub mpg: Option<f64>,
    pub engine_size: Option<f64>,
    pub src_file: Option<String>,
    pub file_hash: Option<String>,
    pub ingest_at: Option<Timestamp>,
}

/// A row from `clean_car_sales`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CleanSaleRow {
    pub model: String,
    pub year: i32,
    pub price: i32,
    pub transmission: String,
    pub mileage: i32,
    pub fuel_type: String,
    pub tax: i32,
    pub mpg: f64,
    pub engine_size: f64,
    pub src_file: String,
    pub ingest_at: Timestamp,
}
