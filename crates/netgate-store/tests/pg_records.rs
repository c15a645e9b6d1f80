#![cfg(feature = "pg-tests")]

use netgate_store::{PostgresConfig, PostgresRecordStore, RecordStore, StoreError, Table};
use std::sync::Arc;

static PG_STORE: tokio::sync::OnceCell<Arc<PostgresRecordStore>> =
    tokio::sync::OnceCell::const_new();

async fn pg_store() -> Option<Arc<PostgresRecordStore>> {
    let url = match std::env::var("NETGATE_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping pg-tests: set NETGATE_TEST_DATABASE_URL or DATABASE_URL");
            return None;
        }
    };
    let config = PostgresConfig::new(url);
    let store = PG_STORE
        .get_or_try_init(|| async {
            PostgresRecordStore::connect(&config).await.map(Arc::new)
        })
        .await;
    match store {
        Ok(store) => Some(store.clone()),
        Err(err) => {
            eprintln!("skipping pg-tests: cannot connect to postgres: {err}");
            None
        }
    }
}

#[tokio::test]
async fn upsert_fetch_and_delete() {
    let Some(store) = pg_store().await else {
        return;
    };
    let key = "pg-test-upsert";
    store.delete(Table::UserGroups, key).await.expect("reset");

    store
        .insert(key, r#"{"id":"pg-test-upsert"}"#, Table::UserGroups)
        .await
        .expect("insert");
    store
        .insert(key, r#"{"id":"pg-test-upsert","meta_data":"v2"}"#, Table::UserGroups)
        .await
        .expect("upsert");
    let payload = store
        .fetch_one(Table::UserGroups, key)
        .await
        .expect("fetch");
    assert!(payload.contains("v2"));

    let all = store.fetch_all(Table::UserGroups).await.expect("fetch all");
    assert!(all.iter().any(|value| value.contains("pg-test-upsert")));

    store.delete(Table::UserGroups, key).await.expect("delete");
    store
        .delete(Table::UserGroups, key)
        .await
        .expect("delete is idempotent");
    let err = store
        .fetch_one(Table::UserGroups, key)
        .await
        .expect_err("deleted");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn tables_do_not_share_keys() {
    let Some(store) = pg_store().await else {
        return;
    };
    let key = "pg-test-shared-key";
    store
        .insert(key, "role", Table::UserPermissions)
        .await
        .expect("insert role");
    store.delete(Table::Users, key).await.expect("reset user");

    let err = store
        .fetch_one(Table::Users, key)
        .await
        .expect_err("user missing");
    assert!(err.is_not_found());
    store
        .delete(Table::UserPermissions, key)
        .await
        .expect("cleanup");
}

#[tokio::test]
async fn backend_health_and_identity() {
    let Some(store) = pg_store().await else {
        return;
    };
    store.health_check().await.expect("health");
    assert!(store.is_durable());
    assert_eq!(store.backend_name(), "postgres");
}
