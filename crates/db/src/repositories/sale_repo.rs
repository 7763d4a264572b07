//! Repository for the `raw_car_sales` and `clean_car_sales` tables.

use carsales_core::records::{CleanRecord, RawRecord};
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::models::batch::{CLEAN_TABLE, RAW_TABLE};
use crate::models::sale::{CleanSaleRow, RawSaleRow};
use crate::DbPool;

/// Postgres caps a single statement at this many bind parameters.
const MAX_BIND_PARAMS: usize = 65_535;

const RAW_INSERT_COLUMNS: &str = "model, year, price, transmission, mileage, fuel_type, \
    tax, mpg, engine_size, src_file, file_hash";
const RAW_INSERT_WIDTH: usize = 11;

const CLEAN_INSERT_COLUMNS: &str = "model, year, price, transmission, mileage, fuel_type, \
    tax, mpg, engine_size, src_file";
const CLEAN_INSERT_WIDTH: usize = 10;

const RAW_COLUMNS: &str = "model, year, price, transmission, mileage, fuel_type, \
    tax, mpg, engine_size, src_file, file_hash, ingest_at";
const CLEAN_COLUMNS: &str = "model, year, price, transmission, mileage, fuel_type, \
    tax, mpg, engine_size, src_file, ingest_at";

/// Rows per INSERT, bounded by the bind-parameter limit for `width` columns.
fn rows_per_statement(requested: usize, width: usize) -> usize {
    requested.clamp(1, MAX_BIND_PARAMS / width)
}

pub struct SaleRepo;

impl SaleRepo {
    /// Bulk-insert raw rows as multi-row INSERT statements of at most
    /// `chunk_rows` rows each. Returns the number of rows inserted.
    pub async fn insert_raw(
        conn: &mut PgConnection,
        rows: &[RawRecord],
        source_file: &str,
        file_hash: &str,
        chunk_rows: usize,
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0;
        for chunk in rows.chunks(rows_per_statement(chunk_rows, RAW_INSERT_WIDTH)) {
            let mut qb: QueryBuilder<'_, Postgres> =
                QueryBuilder::new(format!("INSERT INTO {RAW_TABLE} ({RAW_INSERT_COLUMNS}) "));
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(row.model.as_deref())
                    .push_bind(row.year)
                    .push_bind(row.price)
                    .push_bind(row.transmission.as_deref())
                    .push_bind(row.mileage)
                    .push_bind(row.fuel_type.as_deref())
                    .push_bind(row.tax)
                    .push_bind(row.mpg)
                    .push_bind(row.engine_size)
                    .push_bind(source_file)
                    .push_bind(file_hash);
            });
            inserted += qb.build().execute(&mut *conn).await?.rows_affected();
            tracing::debug!(table = RAW_TABLE, rows = chunk.len(), "Inserted chunk");
        }
        Ok(inserted)
    }

    /// Bulk-insert clean rows; see [`SaleRepo::insert_raw`].
    pub async fn insert_clean(
        conn: &mut PgConnection,
        rows: &[CleanRecord],
        source_file: &str,
        chunk_rows: usize,
    ) -> Result<u64, sqlx::Error> {
        let mut inserted = 0;
        for chunk in rows.chunks(rows_per_statement(chunk_rows, CLEAN_INSERT_WIDTH)) {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {CLEAN_TABLE} ({CLEAN_INSERT_COLUMNS}) "
            ));
            qb.push_values(chunk, |mut b, row| {
                b.push_bind(row.model.as_str())
                    .push_bind(row.year)
                    .push_bind(row.price)
                    .push_bind(row.transmission.as_str())
                    .push_bind(row.mileage)
                    .push_bind(row.fuel_type.as_str())
                    .push_bind(row.tax)
                    .push_bind(row.mpg)
                    .push_bind(row.engine_size)
                    .push_bind(source_file);
            });
            inserted += qb.build().execute(&mut *conn).await?.rows_affected();
            tracing::debug!(table = CLEAN_TABLE, rows = chunk.len(), "Inserted chunk");
        }
        Ok(inserted)
    }

    /// Raw rows loaded from `source_file`, in insertion order.
    pub async fn list_raw(pool: &DbPool, source_file: &str) -> Result<Vec<RawSaleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {RAW_COLUMNS} FROM {RAW_TABLE} WHERE src_file = $1 ORDER BY ctid"
        );
        sqlx::query_as::<_, RawSaleRow>(&query)
            .bind(source_file)
            .fetch_all(pool)
            .await
    }

    /// Clean rows loaded from `source_file`, in insertion order.
    pub async fn list_clean(
        pool: &DbPool,
        source_file: &str,
    ) -> Result<Vec<CleanSaleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CLEAN_COLUMNS} FROM {CLEAN_TABLE} WHERE src_file = $1 ORDER BY ctid"
        );
        sqlx::query_as::<_, CleanSaleRow>(&query)
            .bind(source_file)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_size_respects_bind_limit() {
        assert_eq!(rows_per_statement(1000, RAW_INSERT_WIDTH), 1000);
        assert_eq!(rows_per_statement(0, RAW_INSERT_WIDTH), 1);
        assert_eq!(rows_per_statement(100_000, RAW_INSERT_WIDTH), 5957);
        assert!(rows_per_statement(usize::MAX, CLEAN_INSERT_WIDTH) * CLEAN_INSERT_WIDTH <= MAX_BIND_PARAMS);
    }
}
