use std::path::PathBuf;

use polars::error::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("Schema invalid: missing required columns [{}]", missing.join(", "))]
    SchemaInvalid { missing: Vec<String> },

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The input could not be parsed as CSV.
    #[error("CSV error: {0}")]
    Csv(#[source] PolarsError),

    /// A dataframe operation failed while transforming an extracted table.
    #[error("Dataframe error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
