//! rbac-init entry point.
//!
//! Loads configuration, initializes tracing and runs the startup phase once, then exits.
use anyhow::Context;
use rbac_init::config::RbacInitConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RbacInitConfig::from_env_or_yaml().context("rbac-init config")?;
    rbac_init::observability::init_tracing();
    tracing::info!(backend = config.store.name(), "starting rbac init");
    rbac_init::run(&config).await?;
    Ok(())
}
