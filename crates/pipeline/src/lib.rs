//! End-to-end ETL run for one vehicle-sales CSV file.
//!
//! [`EtlPipeline`] sequences schema bootstrap, extraction, cleaning, row
//! validation, the raw and clean loads, and the quality report.

pub mod error;
pub mod orchestrator;

pub use error::PipelineError;
pub use orchestrator::{EtlPipeline, PipelineReport};
