use std::path::PathBuf;
use std::sync::Arc;

use carsales_core::cleaner::{Cleaner, CleanerConfig};
use carsales_core::extract::extract_csv;
use carsales_core::records::{CleanRecord, RawRecord};
use carsales_core::row_validation::validate_rows;
use carsales_core::source::{LocalFs, SourceFs};
use carsales_db::models::batch::LoadOutcome;
use carsales_db::models::report::QualityReport;
use carsales_db::{BatchLoader, DbPool, QualityReporter};
use serde::Serialize;

use crate::error::PipelineError;

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub source_file: String,
    pub extracted_rows: usize,
    pub cleaned_rows: usize,
    /// False when the cleaned table failed row validation. The clean batch
    /// for this file is then replaced with no rows.
    pub rows_valid: bool,
    pub raw_load: LoadOutcome,
    pub clean_load: LoadOutcome,
    pub quality: QualityReport,
}

/// One CSV file through extract, clean, load and report.
pub struct EtlPipeline {
    csv_path: PathBuf,
    fs: Arc<dyn SourceFs>,
    cleaner: Cleaner,
    loader: BatchLoader,
    reporter: QualityReporter,
    skip_if_unchanged: bool,
}

impl EtlPipeline {
    pub fn new(pool: DbPool, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            fs: Arc::new(LocalFs),
            cleaner: Cleaner::new(CleanerConfig::default()),
            loader: BatchLoader::new(pool.clone()),
            reporter: QualityReporter::new(pool),
            skip_if_unchanged: true,
        }
    }

    pub fn with_cleaner_config(mut self, config: CleanerConfig) -> Self {
        self.cleaner = Cleaner::new(config);
        self
    }

    /// File system used both to read the input and to fingerprint it.
    pub fn with_source_fs(mut self, fs: Arc<dyn SourceFs>) -> Self {
        self.loader = self.loader.with_source_fs(fs.clone());
        self.fs = fs;
        self
    }

    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.loader = self.loader.with_chunk_rows(chunk_rows);
        self
    }

    /// When false, every run appends its rows instead of skipping or
    /// replacing the stored batch.
    pub fn with_skip_if_unchanged(mut self, skip: bool) -> Self {
        self.skip_if_unchanged = skip;
        self
    }

    /// Execute the full run.
    ///
    /// Any error is logged with the failing stage and returned unchanged.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let source_file = self.csv_path.to_string_lossy().into_owned();
        tracing::info!(source_file = %source_file, "Starting ETL pipeline");

        match self.execute(&source_file).await {
            Ok(report) => {
                tracing::info!(
                    source_file = %source_file,
                    raw_count = report.quality.raw_count,
                    clean_count = report.quality.clean_count,
                    dropped = report.quality.dropped,
                    drop_rate = report.quality.drop_rate,
                    unique_models = report.quality.unique_model_count,
                    min_price = ?report.quality.price.min,
                    max_price = ?report.quality.price.max,
                    "ETL pipeline completed",
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    source_file = %source_file,
                    stage = e.stage(),
                    error = %e,
                    "ETL pipeline failed",
                );
                Err(e)
            }
        }
    }

    async fn execute(&self, source_file: &str) -> Result<PipelineReport, PipelineError> {
        tracing::info!("Step 1: ensuring tables");
        self.loader.ensure_schema().await?;

        tracing::info!("Step 2: extracting");
        let raw_frame = extract_csv(self.fs.as_ref(), &self.csv_path)?;
        let raw_rows = RawRecord::from_frame(&raw_frame)?;
        tracing::info!(rows = raw_rows.len(), "Extracted");

        tracing::info!("Step 3: cleaning");
        let clean_frame = self.cleaner.clean(&raw_frame)?;
        tracing::info!(rows = clean_frame.height(), "Cleaned");

        tracing::info!("Step 4: validating cleaned rows");
        let rows_valid = validate_rows(&clean_frame);
        let clean_rows = if rows_valid {
            CleanRecord::from_frame(&clean_frame)?
        } else {
            tracing::warn!(
                source_file,
                "Cleaned rows failed validation, clean batch will be emptied"
            );
            Vec::new()
        };

        tracing::info!("Step 5: loading raw rows");
        let raw_load = self
            .loader
            .load_raw(&raw_rows, source_file, self.skip_if_unchanged)
            .await?;

        tracing::info!("Step 6: loading clean rows");
        let clean_load = self
            .loader
            .load_clean(&clean_rows, source_file, self.skip_if_unchanged)
            .await?;

        tracing::info!("Step 7: generating quality report");
        let quality = self.reporter.report().await?;

        Ok(PipelineReport {
            source_file: source_file.to_string(),
            extracted_rows: raw_rows.len(),
            cleaned_rows: clean_frame.height(),
            rows_valid,
            raw_load,
            clean_load,
            quality,
        })
    }
}
