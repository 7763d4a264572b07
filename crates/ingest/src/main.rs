mod cli;
mod config;

use std::process::ExitCode;

use carsales_pipeline::EtlPipeline;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::{IngestConfig, LogFormat};

const DEFAULT_LOG_FILTER: &str =
    "carsales_ingest=info,carsales_pipeline=info,carsales_db=info,carsales_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match IngestConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    let pool = match carsales_db::create_pool(&config.database_url, &config.pool).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = carsales_db::health_check(&pool).await {
        tracing::error!(error = %e, "Database health check failed");
        return ExitCode::FAILURE;
    }
    tracing::info!(
        max_connections = config.pool.max_connections,
        "Database pool ready"
    );

    let pipeline = EtlPipeline::new(pool.clone(), cli.csv_path)
        .with_cleaner_config(config.cleaner)
        .with_chunk_rows(config.chunk_rows)
        .with_skip_if_unchanged(config.skip_if_unchanged);

    let outcome = pipeline.run().await;
    pool.close().await;

    match outcome {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize report"),
            }
            ExitCode::SUCCESS
        }
        // Already logged with its stage by the pipeline.
        Err(_) => ExitCode::FAILURE,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
