//! Persistence for the raw/clean sales tables.
//!
//! Every component here borrows or holds an explicitly constructed
//! [`DbPool`]; there is no process-global pool. Each database interaction
//! acquires one pooled connection for its duration only.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod loader;
pub mod models;
pub mod reporter;
pub mod repositories;
pub mod schema;

pub use loader::BatchLoader;
pub use reporter::QualityReporter;

pub type DbPool = sqlx::PgPool;

/// Bounds for the shared connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, config: &PoolConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the pool can serve connections.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
