//! Startup phase for the netgate RBAC store.
//!
//! # Purpose
//! Opens the configured record store, checks that it is reachable and seeds the default roles
//! once. Running this before the admin API starts keeps the bootstrap single-writer.
//!
//! # Notes
//! [`build_store`] and [`run`] are public so integration tests can drive the phase without the
//! binary.
pub mod config;
pub mod observability;

use anyhow::{Context, Result};
use config::{RbacInitConfig, StoreBackend};
use netgate_rbac::{BootstrapOutcome, Rbac};
use netgate_store::{InMemoryRecordStore, PostgresRecordStore, RecordStore};
use std::sync::Arc;

/// What the startup phase did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub backend: &'static str,
    pub durable: bool,
    pub bootstrap: Option<BootstrapOutcome>,
    pub role_count: usize,
}

pub async fn build_store(backend: &StoreBackend) -> Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match backend {
        StoreBackend::Memory => Arc::new(InMemoryRecordStore::new()),
        StoreBackend::Postgres(pg) => Arc::new(
            PostgresRecordStore::connect(pg)
                .await
                .context("connect postgres record store")?,
        ),
    };
    Ok(store)
}

pub async fn run(config: &RbacInitConfig) -> Result<InitReport> {
    let store = build_store(&config.store).await?;
    run_with_store(config, store).await
}

pub async fn run_with_store(
    config: &RbacInitConfig,
    store: Arc<dyn RecordStore>,
) -> Result<InitReport> {
    store
        .health_check()
        .await
        .with_context(|| format!("health check {} store", store.backend_name()))?;
    let backend = store.backend_name();
    let durable = store.is_durable();
    tracing::info!(backend, durable, scope_check = %config.scope_check, "record store ready");

    let rbac = Rbac::with_record_users(store, config.scope_check);
    let bootstrap = if config.bootstrap_defaults {
        let outcome = rbac.bootstrap().await.context("bootstrap default roles")?;
        tracing::info!(?outcome, "default role bootstrap finished");
        Some(outcome)
    } else {
        tracing::info!("default role bootstrap disabled");
        None
    };

    let role_count = rbac.roles().list().await.context("list roles")?.len();
    tracing::info!(role_count, "rbac init complete");
    Ok(InitReport {
        backend,
        durable,
        bootstrap,
        role_count,
    })
}
