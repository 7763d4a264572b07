//! Batch identity, existence lookups and load outcomes.
//!
//! A batch is the set of rows one source file contributed to one table,
//! identified by `(src_file, file_hash)`. The `ingest_batches` ledger
//! records the current fingerprint of every batch.

use std::fmt;

use carsales_core::types::{FileHash, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub const RAW_TABLE: &str = "raw_car_sales";
pub const CLEAN_TABLE: &str = "clean_car_sales";
pub const BATCH_TABLE: &str = "ingest_batches";

/// The two tables a batch can be loaded into.
///
/// Table names are only ever interpolated into SQL from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTable {
    Raw,
    Clean,
}

impl TargetTable {
    pub const ALL: [TargetTable; 2] = [TargetTable::Raw, TargetTable::Clean];

    pub const fn name(self) -> &'static str {
        match self {
            TargetTable::Raw => RAW_TABLE,
            TargetTable::Clean => CLEAN_TABLE,
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of asking whether a source file already has a batch in a table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchLookup {
    pub found: bool,
    /// Most recently stored fingerprint, when one is known.
    pub prior_hash: Option<FileHash>,
}

/// A row from the `ingest_batches` ledger.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngestBatch {
    pub table_name: String,
    pub src_file: String,
    pub file_hash: String,
    pub row_count: i64,
    pub loaded_at: Timestamp,
}

/// What a load call did to its target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// No prior batch (or appending): rows were inserted.
    Inserted { rows: u64 },
    /// A prior batch with a different fingerprint was deleted and replaced.
    Replaced { deleted: u64, inserted: u64 },
    /// The stored batch has the same fingerprint; nothing was written.
    Unchanged,
}

impl LoadOutcome {
    /// Whether a write transaction was committed.
    pub fn wrote(&self) -> bool {
        !matches!(self, LoadOutcome::Unchanged)
    }
}
