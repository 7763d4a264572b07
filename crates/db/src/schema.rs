//! Idempotent creation of the sales tables and the batch ledger.

use crate::models::batch::{BATCH_TABLE, CLEAN_TABLE, RAW_TABLE};
use crate::DbPool;

/// Statements run by [`ensure_schema`], in order.
///
/// The raw table is a permissive landing zone: every column is nullable.
/// The clean table rejects nulls everywhere.
pub fn schema_statements() -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {RAW_TABLE} ( \
                model TEXT, \
                year INT, \
                price INT, \
                transmission TEXT, \
                mileage INT, \
                fuel_type TEXT, \
                tax INT, \
                mpg FLOAT, \
                engine_size FLOAT, \
                src_file TEXT, \
                file_hash TEXT, \
                ingest_at TIMESTAMPTZ DEFAULT NOW())"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {CLEAN_TABLE} ( \
                model TEXT NOT NULL, \
                year INT NOT NULL, \
                price INT NOT NULL, \
                transmission TEXT NOT NULL, \
                mileage INT NOT NULL, \
                fuel_type TEXT NOT NULL, \
                tax INT NOT NULL, \
                mpg FLOAT NOT NULL, \
                engine_size FLOAT NOT NULL, \
                src_file TEXT NOT NULL, \
                ingest_at TIMESTAMPTZ NOT NULL DEFAULT NOW())"
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {BATCH_TABLE} ( \
                table_name TEXT NOT NULL, \
                src_file TEXT NOT NULL, \
                file_hash TEXT NOT NULL, \
                row_count BIGINT NOT NULL, \
                loaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                PRIMARY KEY (table_name, src_file))"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{RAW_TABLE}_src_file ON {RAW_TABLE} (src_file)"),
        format!(
            "CREATE INDEX IF NOT EXISTS idx_{CLEAN_TABLE}_src_file ON {CLEAN_TABLE} (src_file)"
        ),
    ]
}

/// Create the raw, clean and ledger tables if they are absent.
///
/// Runs in one transaction so a failure leaves no half-created schema.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in schema_statements() {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    tracing::info!(raw = RAW_TABLE, clean = CLEAN_TABLE, "Tables ready");
    Ok(())
}
