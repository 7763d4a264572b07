//! Read-only quality metrics across the raw and clean tables.

use sqlx::PgConnection;

use crate::models::batch::{CLEAN_TABLE, RAW_TABLE};
use crate::models::report::{PriceAggregates, QualityReport, YearRange};
use crate::DbPool;

pub struct QualityReporter {
    pool: DbPool,
}

impl QualityReporter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Compute a [`QualityReport`] over the current table contents.
    ///
    /// All aggregates run on a single pooled connection.
    pub async fn report(&self) -> Result<QualityReport, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        match collect(&mut conn).await {
            Ok(report) => {
                tracing::info!(
                    raw_count = report.raw_count,
                    clean_count = report.clean_count,
                    dropped = report.dropped,
                    drop_rate = report.drop_rate,
                    unique_models = report.unique_model_count,
                    avg_price = report.price.avg,
                    median_price = report.price.median,
                    "Quality report",
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to compute quality report");
                Err(e)
            }
        }
    }
}

async fn collect(conn: &mut PgConnection) -> Result<QualityReport, sqlx::Error> {
    let raw_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {RAW_TABLE}"))
        .fetch_one(&mut *conn)
        .await?;
    let clean_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {CLEAN_TABLE}"))
        .fetch_one(&mut *conn)
        .await?;
    let unique_models: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(DISTINCT model) FROM {CLEAN_TABLE}"))
            .fetch_one(&mut *conn)
            .await?;

    let (min, max, avg, median): (Option<i32>, Option<i32>, Option<f64>, Option<f64>) =
        sqlx::query_as(&format!(
            "SELECT MIN(price), MAX(price), AVG(price)::FLOAT8, \
                PERCENTILE_CONT(0.5) WITHIN GROUP (ORDER BY price) \
             FROM {CLEAN_TABLE}"
        ))
        .fetch_one(&mut *conn)
        .await?;

    let (oldest, newest): (Option<i32>, Option<i32>) =
        sqlx::query_as(&format!("SELECT MIN(year), MAX(year) FROM {CLEAN_TABLE}"))
            .fetch_one(&mut *conn)
            .await?;

    Ok(QualityReport::from_aggregates(
        raw_count,
        clean_count,
        unique_models,
        PriceAggregates {
            min,
            max,
            avg,
            median,
        },
        YearRange { oldest, newest },
    ))
}
