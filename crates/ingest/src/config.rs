use std::str::FromStr;
use std::time::Duration;

use carsales_core::cleaner::{CleanerConfig, NumericNullPolicy};
use carsales_core::schema::DEFAULT_MIN_MODEL_YEAR;
use carsales_db::loader::DEFAULT_CHUNK_ROWS;
use carsales_db::PoolConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// Ingest run configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub database_url: String,
    pub pool: PoolConfig,
    pub cleaner: CleanerConfig,
    pub chunk_rows: usize,
    pub skip_if_unchanged: bool,
    pub log_format: LogFormat,
}

impl IngestConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `DATABASE_URL`            | (required) |
    /// | `DB_MIN_CONNECTIONS`      | `1`        |
    /// | `DB_MAX_CONNECTIONS`      | `10`       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `30`       |
    /// | `NUMERIC_NULL_POLICY`     | `zero`     |
    /// | `MIN_MODEL_YEAR`          | `2014`     |
    /// | `INSERT_CHUNK_ROWS`       | `1000`     |
    /// | `SKIP_IF_UNCHANGED`       | `true`     |
    /// | `LOG_FORMAT`              | `text`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let pool = PoolConfig {
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 1)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 30)?),
        };
        if pool.min_connections > pool.max_connections {
            return Err(ConfigError::Invalid {
                key: "DB_MIN_CONNECTIONS",
                value: pool.min_connections.to_string(),
            });
        }

        let cleaner = CleanerConfig {
            numeric_nulls: parse_or(&lookup, "NUMERIC_NULL_POLICY", NumericNullPolicy::FillZero)?,
            min_model_year: parse_or(&lookup, "MIN_MODEL_YEAR", DEFAULT_MIN_MODEL_YEAR)?,
        };

        let chunk_rows: usize = parse_or(&lookup, "INSERT_CHUNK_ROWS", DEFAULT_CHUNK_ROWS)?;
        if chunk_rows == 0 {
            return Err(ConfigError::Invalid {
                key: "INSERT_CHUNK_ROWS",
                value: "0".into(),
            });
        }

        Ok(Self {
            database_url,
            pool,
            cleaner,
            chunk_rows,
            skip_if_unchanged: parse_or(&lookup, "SKIP_IF_UNCHANGED", true)?,
            log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Text)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        _ => Ok(default),
    }
}
