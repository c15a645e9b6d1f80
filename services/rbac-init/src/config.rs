use anyhow::{Context, Result, bail};
use netgate_rbac::ScopeCheck;
use netgate_store::PostgresConfig;
use serde::Deserialize;
use std::fs;

// Startup configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct RbacInitConfig {
    pub store: StoreBackend,
    pub scope_check: ScopeCheck,
    pub bootstrap_defaults: bool,
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory,
    Postgres(PostgresConfig),
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgres(_) => "postgres",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RbacInitConfigOverride {
    store_backend: Option<String>,
    postgres: Option<PostgresOverride>,
    scope_check: Option<String>,
    bootstrap_defaults: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PostgresOverride {
    url: Option<String>,
    max_connections: Option<u32>,
    connect_timeout_ms: Option<u64>,
    acquire_timeout_ms: Option<u64>,
}

impl RbacInitConfig {
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("NETGATE_STORE_BACKEND").unwrap_or_else(|_| "memory".into());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres(postgres_from_env()?),
            other => bail!("parse NETGATE_STORE_BACKEND: unknown backend {other:?}"),
        };
        let scope_check = match std::env::var("NETGATE_RBAC_SCOPE_CHECK") {
            Ok(value) => parse_scope_check(&value).context("parse NETGATE_RBAC_SCOPE_CHECK")?,
            Err(_) => ScopeCheck::default(),
        };
        let bootstrap_defaults = match std::env::var("NETGATE_BOOTSTRAP_DEFAULTS") {
            Ok(value) => value
                .trim()
                .parse()
                .with_context(|| "parse NETGATE_BOOTSTRAP_DEFAULTS")?,
            Err(_) => true,
        };
        Ok(Self {
            store,
            scope_check,
            bootstrap_defaults,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("NETGATE_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read NETGATE_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: RbacInitConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse rbac-init config yaml")?;
        if let Some(value) = override_cfg.store_backend {
            self.store = match value.trim().to_ascii_lowercase().as_str() {
                "memory" => StoreBackend::Memory,
                "postgres" => match &self.store {
                    StoreBackend::Postgres(pg) => StoreBackend::Postgres(pg.clone()),
                    StoreBackend::Memory => StoreBackend::Postgres(PostgresConfig::new("")),
                },
                other => bail!("parse store_backend: unknown backend {other:?}"),
            };
        }
        if let Some(pg) = override_cfg.postgres {
            if let StoreBackend::Postgres(current) = &mut self.store {
                if let Some(url) = pg.url {
                    current.url = url;
                }
                if let Some(value) = pg.max_connections {
                    current.max_connections = value;
                }
                if let Some(value) = pg.connect_timeout_ms {
                    current.connect_timeout_ms = value;
                }
                if let Some(value) = pg.acquire_timeout_ms {
                    current.acquire_timeout_ms = value;
                }
            }
        }
        if let StoreBackend::Postgres(pg) = &self.store
            && pg.url.is_empty()
        {
            bail!("postgres store selected but no url configured");
        }
        if let Some(value) = override_cfg.scope_check {
            self.scope_check = parse_scope_check(&value).context("parse scope_check")?;
        }
        if let Some(value) = override_cfg.bootstrap_defaults {
            self.bootstrap_defaults = value;
        }
        Ok(())
    }
}

fn postgres_from_env() -> Result<PostgresConfig> {
    let url = std::env::var("NETGATE_POSTGRES_URL")
        .with_context(|| "NETGATE_POSTGRES_URL is required for the postgres backend")?;
    let mut pg = PostgresConfig::new(url);
    if let Ok(value) = std::env::var("NETGATE_POSTGRES_MAX_CONNECTIONS") {
        pg.max_connections = value
            .parse()
            .with_context(|| "parse NETGATE_POSTGRES_MAX_CONNECTIONS")?;
    }
    if let Ok(value) = std::env::var("NETGATE_POSTGRES_CONNECT_TIMEOUT_MS") {
        pg.connect_timeout_ms = value
            .parse()
            .with_context(|| "parse NETGATE_POSTGRES_CONNECT_TIMEOUT_MS")?;
    }
    if let Ok(value) = std::env::var("NETGATE_POSTGRES_ACQUIRE_TIMEOUT_MS") {
        pg.acquire_timeout_ms = value
            .parse()
            .with_context(|| "parse NETGATE_POSTGRES_ACQUIRE_TIMEOUT_MS")?;
    }
    Ok(pg)
}

fn parse_scope_check(value: &str) -> Result<ScopeCheck> {
    value.parse::<ScopeCheck>().map_err(anyhow::Error::msg)
}
