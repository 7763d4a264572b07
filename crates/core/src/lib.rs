//! Domain logic for the vehicle-sales ingestion pipeline.
//!
//! Everything in this crate is free of database access: the column
//! contract, CSV extraction into polars dataframes, schema and
//! row validation, the cleaning transform sequence, and file
//! fingerprinting. The `carsales-db` crate persists what this crate
//! produces.

pub mod cleaner;
pub mod error;
pub mod extract;
pub mod hashing;
pub mod records;
pub mod row_validation;
pub mod schema;
pub mod schema_validation;
pub mod source;
pub mod table;
pub mod types;
