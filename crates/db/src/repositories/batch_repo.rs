//! Repository for batch existence checks and the `ingest_batches` ledger.

use sqlx::PgConnection;

use crate::models::batch::{BatchLookup, IngestBatch, TargetTable, BATCH_TABLE, RAW_TABLE};
use crate::DbPool;

/// Column list shared across ledger queries.
const COLUMNS: &str = "table_name, src_file, file_hash, row_count, loaded_at";

pub struct BatchRepo;

impl BatchRepo {
    /// Whether `table` already holds a batch for `source_file`, and the
    /// fingerprint it was loaded with.
    ///
    /// The ledger is authoritative for the fingerprint; for the raw table
    /// the newest stored `file_hash` is the fallback. Runs on its own
    /// pooled connection, released on every exit path.
    pub async fn exists(
        pool: &DbPool,
        source_file: &str,
        table: TargetTable,
    ) -> Result<BatchLookup, sqlx::Error> {
        let fallback = match table {
            TargetTable::Raw => format!(
                "(SELECT file_hash FROM {RAW_TABLE} WHERE src_file = $1 \
                 ORDER BY ingest_at DESC NULLS LAST LIMIT 1)"
            ),
            TargetTable::Clean => "NULL::TEXT".to_string(),
        };
        let query = format!(
            "SELECT \
                EXISTS (SELECT 1 FROM {table} WHERE src_file = $1) \
                OR EXISTS (SELECT 1 FROM {BATCH_TABLE} WHERE table_name = $2 AND src_file = $1) \
                    AS found, \
                COALESCE( \
                    (SELECT file_hash FROM {BATCH_TABLE} WHERE table_name = $2 AND src_file = $1), \
                    {fallback}) AS prior_hash"
        );
        let (found, prior_hash): (bool, Option<String>) = sqlx::query_as(&query)
            .bind(source_file)
            .bind(table.name())
            .fetch_one(pool)
            .await?;

        Ok(BatchLookup {
            found,
            prior_hash: if found { prior_hash } else { None },
        })
    }

    /// Ledger entry for a batch, if one was ever recorded.
    pub async fn find(
        pool: &DbPool,
        source_file: &str,
        table: TargetTable,
    ) -> Result<Option<IngestBatch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {BATCH_TABLE} WHERE table_name = $1 AND src_file = $2"
        );
        sqlx::query_as::<_, IngestBatch>(&query)
            .bind(table.name())
            .bind(source_file)
            .fetch_optional(pool)
            .await
    }

    /// Delete every row `source_file` contributed to `table`.
    ///
    /// Takes a connection so it can run inside the caller's transaction.
    pub async fn delete_rows(
        conn: &mut PgConnection,
        source_file: &str,
        table: TargetTable,
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM {table} WHERE src_file = $1");
        let result = sqlx::query(&query).bind(source_file).execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// Upsert the ledger entry for a batch with its new fingerprint and
    /// current row count.
    pub async fn record(
        conn: &mut PgConnection,
        source_file: &str,
        table: TargetTable,
        file_hash: &str,
    ) -> Result<IngestBatch, sqlx::Error> {
        let query = format!(
            "INSERT INTO {BATCH_TABLE} (table_name, src_file, file_hash, row_count) \
             VALUES ($1, $2, $3, (SELECT COUNT(*) FROM {table} WHERE src_file = $2)) \
             ON CONFLICT (table_name, src_file) DO UPDATE \
                SET file_hash = EXCLUDED.file_hash, \
                    row_count = EXCLUDED.row_count, \
                    loaded_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IngestBatch>(&query)
            .bind(table.name())
            .bind(source_file)
            .bind(file_hash)
            .fetch_one(conn)
            .await
    }

    /// Number of rows `source_file` currently has in `table`.
    pub async fn count_rows(
        pool: &DbPool,
        source_file: &str,
        table: TargetTable,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {table} WHERE src_file = $1");
        sqlx::query_scalar(&query)
            .bind(source_file)
            .fetch_one(pool)
            .await
    }
}
