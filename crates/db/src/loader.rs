//! Transactional, idempotent batch loads into the raw and clean tables.
//!
//! A load fingerprints the source file, compares it with the stored batch
//! and then either skips, replaces or appends. Delete, insert and the
//! ledger update share one transaction: a failure anywhere rolls the table
//! back to its prior state.

use std::path::Path;
use std::sync::Arc;

use carsales_core::hashing::{hash_source, is_unchanged};
use carsales_core::records::{CleanRecord, RawRecord};
use carsales_core::source::{LocalFs, SourceFs};
use sqlx::PgConnection;

use crate::models::batch::{LoadOutcome, TargetTable};
use crate::repositories::{BatchRepo, SaleRepo};
use crate::DbPool;

/// Rows per INSERT statement unless configured otherwise.
pub const DEFAULT_CHUNK_ROWS: usize = 1000;

#[derive(Clone, Copy)]
enum Rows<'a> {
    Raw(&'a [RawRecord]),
    Clean(&'a [CleanRecord]),
}

impl Rows<'_> {
    fn table(self) -> TargetTable {
        match self {
            Rows::Raw(_) => TargetTable::Raw,
            Rows::Clean(_) => TargetTable::Clean,
        }
    }

    fn len(self) -> usize {
        match self {
            Rows::Raw(rows) => rows.len(),
            Rows::Clean(rows) => rows.len(),
        }
    }
}

/// Loads batches through a shared pool.
#[derive(Clone)]
pub struct BatchLoader {
    pool: DbPool,
    chunk_rows: usize,
    fs: Arc<dyn SourceFs>,
}

impl BatchLoader {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            chunk_rows: DEFAULT_CHUNK_ROWS,
            fs: Arc::new(LocalFs),
        }
    }

    /// File system the source files are fingerprinted through.
    pub fn with_source_fs(mut self, fs: Arc<dyn SourceFs>) -> Self {
        self.fs = fs;
        self
    }

    /// Override the number of rows sent per INSERT statement.
    pub fn with_chunk_rows(mut self, chunk_rows: usize) -> Self {
        self.chunk_rows = chunk_rows.max(1);
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Create the sales tables and the batch ledger if absent.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        crate::schema::ensure_schema(&self.pool).await
    }

    /// Load unvalidated rows into the raw table.
    ///
    /// With `skip_if_unchanged`, an existing batch with the same
    /// fingerprint is left alone and a stale one is replaced. Without it,
    /// rows are always appended.
    pub async fn load_raw(
        &self,
        rows: &[RawRecord],
        source_file: &str,
        skip_if_unchanged: bool,
    ) -> Result<LoadOutcome, sqlx::Error> {
        self.load(Rows::Raw(rows), source_file, skip_if_unchanged)
            .await
    }

    /// Load cleaned rows into the clean table; see [`BatchLoader::load_raw`].
    pub async fn load_clean(
        &self,
        rows: &[CleanRecord],
        source_file: &str,
        skip_if_unchanged: bool,
    ) -> Result<LoadOutcome, sqlx::Error> {
        self.load(Rows::Clean(rows), source_file, skip_if_unchanged)
            .await
    }

    async fn load(
        &self,
        rows: Rows<'_>,
        source_file: &str,
        skip_if_unchanged: bool,
    ) -> Result<LoadOutcome, sqlx::Error> {
        let table = rows.table();
        let file_hash = hash_source(self.fs.as_ref(), Path::new(source_file));
        if file_hash.is_empty() {
            tracing::warn!(
                table = %table,
                source_file,
                "Source file could not be fingerprinted, treating batch as changed",
            );
        }

        let lookup = BatchRepo::exists(&self.pool, source_file, table).await?;
        if lookup.found
            && skip_if_unchanged
            && is_unchanged(&file_hash, lookup.prior_hash.as_deref())
        {
            tracing::info!(table = %table, source_file, "Batch unchanged, skipping load");
            return Ok(LoadOutcome::Unchanged);
        }
        let replace = lookup.found && skip_if_unchanged;

        let mut tx = self.pool.begin().await?;
        match self
            .write_batch(&mut tx, rows, source_file, &file_hash, replace)
            .await
        {
            Ok((deleted, inserted)) => {
                tx.commit().await?;
                tracing::info!(
                    table = %table,
                    source_file,
                    deleted,
                    inserted,
                    "Batch loaded",
                );
                Ok(if replace {
                    LoadOutcome::Replaced { deleted, inserted }
                } else {
                    LoadOutcome::Inserted { rows: inserted }
                })
            }
            Err(e) => {
                tracing::error!(
                    table = %table,
                    source_file,
                    rows = rows.len(),
                    error = %e,
                    "Batch load failed, rolling back",
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn write_batch(
        &self,
        conn: &mut PgConnection,
        rows: Rows<'_>,
        source_file: &str,
        file_hash: &str,
        replace: bool,
    ) -> Result<(u64, u64), sqlx::Error> {
        let table = rows.table();
        let deleted = if replace {
            BatchRepo::delete_rows(&mut *conn, source_file, table).await?
        } else {
            0
        };

        let inserted = match rows {
            Rows::Raw(rows) => {
                SaleRepo::insert_raw(&mut *conn, rows, source_file, file_hash, self.chunk_rows)
                    .await?
            }
            Rows::Clean(rows) => {
                SaleRepo::insert_clean(&mut *conn, rows, source_file, self.chunk_rows).await?
            }
        };

        BatchRepo::record(&mut *conn, source_file, table, file_hash).await?;
        Ok((deleted, inserted))
    }
}
