//! In-memory implementation of the record store.
//!
//! # Purpose
//! Implements [`RecordStore`] with ordered maps guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: each call takes a read or write lock for its whole duration,
//!   so individual operations are atomic. Sequences of calls are not.
//!
//! # Ordering
//! Records are kept in a `BTreeMap` per table, so `fetch_all` returns payloads in key order.
//! Callers must not depend on this; the Postgres backend orders the same way but other backends
//! may not.
use super::{RecordStore, StoreError, StoreResult, Table};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory record store.
///
/// Cloning shares the underlying tables, so one store can back several registries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<HashMap<Table, BTreeMap<String, String>>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held in `table`.
    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    pub async fn is_empty(&self, table: Table) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, key: &str, value: &str, table: Table) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let records = tables.entry(table).or_default();
        records.insert(key.to_string(), value.to_string());
        metrics::gauge!("netgate_store_records", "table" => table.as_str())
            .set(records.len() as f64);
        Ok(())
    }

    async fn fetch_one(&self, table: Table, key: &str) -> StoreResult<String> {
        self.tables
            .read()
            .await
            .get(&table)
            .and_then(|records| records.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{table}/{key}")))
    }

    async fn fetch_all(&self, table: Table) -> StoreResult<Vec<String>> {
        Ok(self
            .tables
            .read()
            .await
            .get(&table)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, table: Table, key: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(records) = tables.get_mut(&table) {
            records.remove(key);
            metrics::gauge!("netgate_store_records", "table" => table.as_str())
                .set(records.len() as f64);
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_overwrites_and_fetch_one_reads_back() {
        let store = InMemoryRecordStore::new();
        store
            .insert("admin", "{\"v\":1}", Table::UserPermissions)
            .await
            .expect("insert");
        store
            .insert("admin", "{\"v\":2}", Table::UserPermissions)
            .await
            .expect("overwrite");

        let value = store
            .fetch_one(Table::UserPermissions, "admin")
            .await
            .expect("fetch");
        assert_eq!(value, "{\"v\":2}");
        assert_eq!(store.len(Table::UserPermissions).await, 1);
    }

    #[tokio::test]
    async fn fetch_one_missing_is_not_found() {
        let store = InMemoryRecordStore::new();
        let err = store
            .fetch_one(Table::UserGroups, "missing")
            .await
            .expect_err("missing record");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn tables_are_isolated_and_listing_is_ordered() {
        let store = InMemoryRecordStore::new();
        store.insert("b", "2", Table::Users).await.expect("insert");
        store.insert("a", "1", Table::Users).await.expect("insert");
        store
            .insert("a", "group", Table::UserGroups)
            .await
            .expect("insert");

        let users = store.fetch_all(Table::Users).await.expect("users");
        assert_eq!(users, vec!["1".to_string(), "2".to_string()]);
        let roles = store.fetch_all(Table::UserPermissions).await.expect("roles");
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemoryRecordStore::new();
        store.insert("g1", "{}", Table::UserGroups).await.expect("insert");
        store.delete(Table::UserGroups, "g1").await.expect("delete");
        store
            .delete(Table::UserGroups, "g1")
            .await
            .expect("second delete");
        store
            .delete(Table::Users, "never-existed")
            .await
            .expect("delete in empty table");
        assert!(store.is_empty(Table::UserGroups).await);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryRecordStore::new();
        let clone = store.clone();
        clone.insert("k", "v", Table::Users).await.expect("insert");
        assert_eq!(store.fetch_one(Table::Users, "k").await.expect("fetch"), "v");
    }

    #[tokio::test]
    async fn backend_health_and_identity() {
        let store = InMemoryRecordStore::new();
        store.health_check().await.expect("health");
        assert!(!store.is_durable());
        assert_eq!(store.backend_name(), "memory");
    }
}
