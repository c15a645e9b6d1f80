//! Run-once gate for seeding the default roles.
//!
//! `RoleRegistry::bootstrap_defaults` is idempotent but has no protection against concurrent
//! callers. The gate makes the seed an explicit startup step: the first successful run closes it
//! for the lifetime of the gate, and later calls return without touching the store. A failed run
//! leaves the gate open so startup can retry.
use crate::errors::{RbacError, RbacResult};
use crate::roles::RoleRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// This call wrote the default roles.
    Seeded,
    /// An earlier call already did.
    AlreadyDone,
}

#[derive(Debug, Default)]
pub struct BootstrapGate {
    done: OnceCell<()>,
}

impl BootstrapGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done.initialized()
    }

    pub async fn run(&self, roles: &RoleRegistry) -> RbacResult<BootstrapOutcome> {
        let ran = AtomicBool::new(false);
        self.done
            .get_or_try_init(|| async {
                roles.bootstrap_defaults().await?;
                ran.store(true, Ordering::Release);
                Ok::<(), RbacError>(())
            })
            .await?;
        if ran.load(Ordering::Acquire) {
            Ok(BootstrapOutcome::Seeded)
        } else {
            Ok(BootstrapOutcome::AlreadyDone)
        }
    }
}
