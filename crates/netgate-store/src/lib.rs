//! Key/value record store used by the netgate control plane.
//!
//! # Purpose
//! Persists opaque string payloads keyed by an entity id inside a small, fixed set of tables.
//! Higher layers (the RBAC registries and the user directory) own encoding; this crate only moves
//! strings in and out.
//!
//! # Key invariants
//! - `insert` is an upsert: writing an existing key replaces its payload.
//! - `fetch_one` on a missing key returns [`StoreError::NotFound`].
//! - `fetch_all` on an empty table returns an empty list, never an error.
//! - `delete` is idempotent: deleting a missing key succeeds.
//!
//! # Consistency
//! There are no multi-record transactions. Every call is atomic on its own and nothing more;
//! read-then-write sequences built on top of this trait can race.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRecordStore;
pub use postgres::{PostgresConfig, PostgresRecordStore};

/// Table identifiers known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    UserPermissions,
    UserGroups,
    Users,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::UserPermissions, Table::UserGroups, Table::Users];

    pub fn as_str(self) -> &'static str {
        match self {
            Table::UserPermissions => "user_permissions",
            Table::UserGroups => "user_groups",
            Table::Users => "users",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Table {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|table| table.as_str() == value)
            .ok_or_else(|| StoreError::NotFound(format!("table {value}")))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, key: &str, value: &str, table: Table) -> StoreResult<()>;
    async fn fetch_one(&self, table: Table, key: &str) -> StoreResult<String>;
    async fn fetch_all(&self, table: Table) -> StoreResult<Vec<String>>;
    async fn delete(&self, table: Table, key: &str) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
