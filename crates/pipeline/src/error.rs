use carsales_core::error::CoreError;

/// Failure that aborts a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Extraction, schema or cleaning failure. Raised before any write.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A load or report query failed. Any open transaction was rolled back.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    /// Name of the step that failed, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Core(
                CoreError::InputNotFound { .. }
                | CoreError::SchemaInvalid { .. }
                | CoreError::Csv(_)
                | CoreError::Io(_),
            ) => "extract",
            PipelineError::Core(
                CoreError::MalformedTable(_) | CoreError::Validation(_) | CoreError::Polars(_),
            ) => "transform",
            PipelineError::Database(_) => "database",
        }
    }
}
