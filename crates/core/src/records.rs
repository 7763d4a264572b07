//! Row shapes persisted to the raw and clean tables.

use polars::prelude::*;
use serde::Serialize;

use crate::cleaner::{coerce_types, rename_columns};
use crate::error::CoreError;
use crate::schema::{
    COL_ENGINE_SIZE, COL_FUEL_TYPE, COL_MILEAGE, COL_MODEL, COL_MPG, COL_PRICE, COL_TAX,
    COL_TRANSMISSION, COL_YEAR,
};
use crate::table::{expect_dtype, require};

/// One row of the permissive raw table. Every business field may be null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub model: Option<String>,
    pub year: Option<i32>,
    pub price: Option<i32>,
    pub transmission: Option<String>,
    pub mileage: Option<i32>,
    pub fuel_type: Option<String>,
    pub tax: Option<i32>,
    pub mpg: Option<f64>,
    pub engine_size: Option<f64>,
}

/// One row of the clean table. Every business field is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub model: String,
    pub year: i32,
    pub price: i32,
    pub transmission: String,
    pub mileage: i32,
    pub fuel_type: String,
    pub tax: i32,
    pub mpg: f64,
    pub engine_size: f64,
}

impl RawRecord {
    /// Convert an extracted table into raw rows.
    ///
    /// Columns are renamed and cast the way the cleaner does it. Text is
    /// trimmed but keeps its case; numbers that do not parse are stored as
    /// null.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, CoreError> {
        let df = coerce_types(rename_columns(df.clone())?)?;

        let model = raw_text(&df, COL_MODEL)?;
        let year = ints(&df, COL_YEAR)?;
        let price = ints(&df, COL_PRICE)?;
        let transmission = raw_text(&df, COL_TRANSMISSION)?;
        let mileage = ints(&df, COL_MILEAGE)?;
        let fuel_type = raw_text(&df, COL_FUEL_TYPE)?;
        let tax = ints(&df, COL_TAX)?;
        let mpg = floats(&df, COL_MPG)?;
        let engine_size = floats(&df, COL_ENGINE_SIZE)?;

        Ok((0..df.height())
            .map(|row| RawRecord {
                model: model[row].clone(),
                year: year[row],
                price: price[row],
                transmission: transmission[row].clone(),
                mileage: mileage[row],
                fuel_type: fuel_type[row].clone(),
                tax: tax[row],
                mpg: mpg[row],
                engine_size: engine_size[row],
            })
            .collect())
    }
}

impl CleanRecord {
    /// Convert a cleaned table into clean rows.
    ///
    /// The table must carry every canonical business column with its
    /// declared type and no nulls.
    pub fn from_frame(df: &DataFrame) -> Result<Vec<Self>, CoreError> {
        let model = texts(df, COL_MODEL)?;
        let year = ints(df, COL_YEAR)?;
        let price = ints(df, COL_PRICE)?;
        let transmission = texts(df, COL_TRANSMISSION)?;
        let mileage = ints(df, COL_MILEAGE)?;
        let fuel_type = texts(df, COL_FUEL_TYPE)?;
        let tax = ints(df, COL_TAX)?;
        let mpg = floats(df, COL_MPG)?;
        let engine_size = floats(df, COL_ENGINE_SIZE)?;

        (0..df.height())
            .map(|row| {
                Ok(CleanRecord {
                    model: present(&model[row], COL_MODEL, row)?.clone(),
                    year: *present(&year[row], COL_YEAR, row)?,
                    price: *present(&price[row], COL_PRICE, row)?,
                    transmission: present(&transmission[row], COL_TRANSMISSION, row)?.clone(),
                    mileage: *present(&mileage[row], COL_MILEAGE, row)?,
                    fuel_type: present(&fuel_type[row], COL_FUEL_TYPE, row)?.clone(),
                    tax: *present(&tax[row], COL_TAX, row)?,
                    mpg: *present(&mpg[row], COL_MPG, row)?,
                    engine_size: *present(&engine_size[row], COL_ENGINE_SIZE, row)?,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Any column type is read as text, trimmed, with blanks as null.
fn raw_text(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, CoreError> {
    let series = require(df, name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

fn texts(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, CoreError> {
    let series = require(df, name)?;
    expect_dtype(series, &DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|cell| cell.map(str::to_string))
        .collect())
}

fn ints(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>, CoreError> {
    let series = require(df, name)?;
    expect_dtype(series, &DataType::Int32)?;
    Ok(series.i32()?.into_iter().collect())
}

fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, CoreError> {
    let series = require(df, name)?;
    expect_dtype(series, &DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn present<'a, T>(cell: &'a Option<T>, name: &str, row: usize) -> Result<&'a T, CoreError> {
    cell.as_ref()
        .ok_or_else(|| CoreError::MalformedTable(format!("null '{name}' at row {row}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::Cleaner;
    use crate::extract::read_csv;
    use assert_matches::assert_matches;

    const HEADER: &str = "model,year,price,transmission,mileage,fuelType,tax,mpg,engineSize";

    #[test]
    fn raw_records_keep_case_and_nulls() {
        let data = format!("{HEADER}\n  X5 ,2016,abc,Automatic,,Diesel,150,45.5,2.0\n");
        let df = read_csv(data.as_bytes()).unwrap();
        let rows = RawRecord::from_frame(&df).unwrap();

        assert_eq!(
            rows,
            vec![RawRecord {
                model: Some("X5".into()),
                year: Some(2016),
                price: None,
                transmission: Some("Automatic".into()),
                mileage: None,
                fuel_type: Some("Diesel".into()),
                tax: Some(150),
                mpg: Some(45.5),
                engine_size: Some(2.0),
            }]
        );
    }

    #[test]
    fn clean_records_follow_cleaned_table() {
        let data = format!("{HEADER}\n  BMW X5 ,2016,25000,Automatic,,Diesel,150,45.5,2.0\n");
        let df = Cleaner::default()
            .clean(&read_csv(data.as_bytes()).unwrap())
            .unwrap();
        let rows = CleanRecord::from_frame(&df).unwrap();

        assert_eq!(
            rows,
            vec![CleanRecord {
                model: "bmw x5".into(),
                year: 2016,
                price: 25000,
                transmission: "automatic".into(),
                mileage: 0,
                fuel_type: "diesel".into(),
                tax: 150,
                mpg: 45.5,
                engine_size: 2.0,
            }]
        );
    }

    #[test]
    fn clean_conversion_rejects_uncleaned_table() {
        let data = format!("{HEADER}\nx5,2016,25000,Automatic,10,Diesel,150,45.5,2.0\n");
        let df = read_csv(data.as_bytes()).unwrap();
        // Still text-typed and using ingestion names.
        assert_matches!(
            CleanRecord::from_frame(&df),
            Err(CoreError::MalformedTable(_))
        );
    }

    #[test]
    fn clean_conversion_rejects_nulls() {
        let df = df!(
            "model" => ["x5"],
            "year" => [2016i32],
            "price" => [25000i32],
            "transmission" => ["manual"],
            "mileage" => [None::<i32>],
            "fuel_type" => ["petrol"],
            "tax" => [145i32],
            "mpg" => [50.0f64],
            "engine_size" => [1.5f64]
        )
        .unwrap();
        assert_matches!(
            CleanRecord::from_frame(&df),
            Err(CoreError::MalformedTable(msg)) if msg.contains("mileage")
        );
    }
}
