use std::path::PathBuf;

use clap::Parser;

/// Load one vehicle-sales CSV file into the raw and clean tables.
#[derive(Debug, Clone, Parser)]
#[command(name = "carsales-ingest", version)]
pub struct Cli {
    /// CSV file to ingest
    #[arg(value_name = "PATH", env = "CSV_PATH")]
    pub csv_path: PathBuf,
}
