//! Role registry: CRUD over permission templates.
//!
//! # Purpose
//! Stores [`UserRolePermissionTemplate`] records keyed by role id and seeds the default roles.
//!
//! # Key invariants
//! - Role ids are never empty once persisted.
//! - Deletion is allowed only after [`ReferentialIntegrityGuard`] finds no reference.
//! - Nothing here re-checks references after the guard passes; a user assigned the role between
//!   the scan and the delete keeps a dangling id, which the resolver treats as no grant.
use crate::defaults::default_templates;
use crate::directory::UserDirectory;
use crate::errors::{RbacError, RbacResult};
use crate::guard::ReferentialIntegrityGuard;
use crate::model::{UserGroup, UserRolePermissionTemplate};
use crate::registry::Registry;
use crate::types::RoleId;
use netgate_store::RecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct RoleRegistry {
    roles: Registry<UserRolePermissionTemplate>,
    guard: ReferentialIntegrityGuard,
}

impl RoleRegistry {
    pub fn new(store: Arc<dyn RecordStore>, users: Arc<dyn UserDirectory>) -> Self {
        let groups = Registry::<UserGroup>::new(store.clone());
        Self {
            roles: Registry::new(store),
            guard: ReferentialIntegrityGuard::new(users, groups),
        }
    }

    /// Write the four default templates, overwriting whatever is stored under their ids.
    ///
    /// Safe to repeat. Not safe to race with itself or with role updates; run it from a single
    /// startup phase (see [`crate::BootstrapGate`]).
    pub async fn bootstrap_defaults(&self) -> RbacResult<()> {
        for template in default_templates() {
            self.roles.put(&template).await?;
        }
        metrics::counter!("netgate_rbac_bootstrap_total").increment(1);
        tracing::info!("default roles written");
        Ok(())
    }

    pub async fn list(&self) -> RbacResult<Vec<UserRolePermissionTemplate>> {
        self.roles.list().await
    }

    pub async fn create(
        &self,
        template: UserRolePermissionTemplate,
    ) -> RbacResult<UserRolePermissionTemplate> {
        self.roles.create(template).await
    }

    pub async fn get(&self, role_id: &RoleId) -> RbacResult<UserRolePermissionTemplate> {
        self.roles.get(role_id.as_str()).await
    }

    /// Replace the stored template. Fails with `NotFound` rather than creating.
    pub async fn update(
        &self,
        template: UserRolePermissionTemplate,
    ) -> RbacResult<UserRolePermissionTemplate> {
        self.roles.update(template).await
    }

    pub async fn delete(&self, role_id: &RoleId) -> RbacResult<()> {
        if role_id.is_empty() {
            return Err(RbacError::InvalidInput("role id cannot be empty".to_string()));
        }
        self.guard.ensure_role_unreferenced(role_id).await?;
        self.roles.remove(role_id.as_str()).await?;
        tracing::info!(role = %role_id, "role deleted");
        Ok(())
    }
}
