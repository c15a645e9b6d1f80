//! Postgres-backed implementation of the record store.
//!
//! # What this module is
//! A durable [`RecordStore`] for deployments that run more than one control-plane process or need
//! RBAC state to survive restarts. Every logical table lives in a single physical table,
//! `rbac_records`, keyed by `(table_name, record_key)`.
//!
//! # Key invariants
//! - `insert` is an `INSERT .. ON CONFLICT DO UPDATE`, so it never fails on an existing key.
//! - `table_name` values come from [`Table::as_str`]; no caller-provided string reaches SQL text.
//! - Payloads are stored verbatim as `TEXT`; this module never parses them.
//!
//! # Security notes
//! - Database URLs may contain credentials; avoid logging them.
//! - Use a least-privilege DB role (CRUD on `rbac_records` plus migration rights).
//!
//! # Operational notes
//! Migrations are embedded with `sqlx::migrate!("./migrations")` and run on connect, before any
//! registry touches the store. Pool timeouts are explicit so a dead database fails startup instead
//! of hanging it.
use super::{RecordStore, StoreError, StoreResult, Table};
use anyhow::anyhow;
use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

/// Connection settings for [`PostgresRecordStore`].
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
        }
    }
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MS
}

/// Durable record store backed by Postgres.
///
/// # Example
/// ```rust,no_run
/// use netgate_store::{PostgresConfig, PostgresRecordStore};
///
/// async fn open() {
///     let config = PostgresConfig::new("postgres://netgate@localhost/netgate");
///     let _ = PostgresRecordStore::connect(&config).await;
/// }
/// ```
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Connect, build the pool and apply embedded migrations.
    ///
    /// # Errors
    /// - Invalid URL, connection, pool or migration failures.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        let store = Self::connect_without_migrations(pg).await?;
        // The schema must exist before any registry reads or writes.
        sqlx::migrate!("./migrations").run(&store.pool).await?;
        Ok(store)
    }

    /// Connect without running migrations, for schemas managed out of band.
    pub async fn connect_without_migrations(pg: &PostgresConfig) -> StoreResult<Self> {
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let connect = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options);
        let pool = tokio::time::timeout(Duration::from_millis(pg.connect_timeout_ms), connect)
            .await
            .map_err(|_| StoreError::Unexpected(anyhow!("timed out connecting to postgres")))??;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn insert(&self, key: &str, value: &str, table: Table) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO rbac_records (table_name, record_key, payload) VALUES ($1, $2, $3)
               ON CONFLICT (table_name, record_key)
               DO UPDATE SET payload = EXCLUDED.payload, updated_at = now()"#,
        )
        .bind(table.as_str())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_one(&self, table: Table, key: &str) -> StoreResult<String> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"SELECT payload FROM rbac_records WHERE table_name = $1 AND record_key = $2"#,
        )
        .bind(table.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some((payload,)) => Ok(payload),
            None => Err(StoreError::NotFound(format!("{table}/{key}"))),
        }
    }

    async fn fetch_all(&self, table: Table) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"SELECT payload FROM rbac_records WHERE table_name = $1 ORDER BY record_key"#,
        )
        .bind(table.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(payload,)| payload).collect())
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        sqlx::query(r#"DELETE FROM rbac_records WHERE table_name = $1 AND record_key = $2"#)
            .bind(table.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".into()),
            err if is_unique_violation(&err) => StoreError::Conflict(err.to_string()),
            err => StoreError::Unexpected(err.into()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_new_uses_defaults() {
        let config = PostgresConfig::new("postgres://localhost/netgate");
        assert_eq!(config.url, "postgres://localhost/netgate");
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(config.acquire_timeout_ms, DEFAULT_ACQUIRE_TIMEOUT_MS);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_connecting() {
        let config = PostgresConfig::new("not a url");
        let result = PostgresRecordStore::connect_without_migrations(&config).await;
        assert!(matches!(result, Err(StoreError::Unexpected(_))));
    }
}
