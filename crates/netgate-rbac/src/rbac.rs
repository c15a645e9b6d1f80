//! Facade wiring the registries, guard, resolver and bootstrap gate over one store.
use crate::bootstrap::{BootstrapGate, BootstrapOutcome};
use crate::directory::{RecordUserDirectory, UserDirectory};
use crate::errors::RbacResult;
use crate::groups::GroupRegistry;
use crate::resolver::{AccessResolver, ScopeCheck};
use crate::roles::RoleRegistry;
use crate::types::{NetworkId, ResourceId, ResourceType, RoleId};
use netgate_store::RecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct Rbac {
    roles: RoleRegistry,
    groups: GroupRegistry,
    resolver: AccessResolver,
    bootstrap: Arc<BootstrapGate>,
}

impl Rbac {
    pub fn new(
        store: Arc<dyn RecordStore>,
        users: Arc<dyn UserDirectory>,
        scope_check: ScopeCheck,
    ) -> Self {
        Self {
            roles: RoleRegistry::new(store.clone(), users.clone()),
            groups: GroupRegistry::new(store, users),
            resolver: AccessResolver::new(scope_check),
            bootstrap: Arc::new(BootstrapGate::new()),
        }
    }

    /// Keep users in the same record store as roles and groups.
    pub fn with_record_users(store: Arc<dyn RecordStore>, scope_check: ScopeCheck) -> Self {
        let users = Arc::new(RecordUserDirectory::new(store.clone()));
        Self::new(store, users, scope_check)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn groups(&self) -> &GroupRegistry {
        &self.groups
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    pub async fn bootstrap(&self) -> RbacResult<BootstrapOutcome> {
        self.bootstrap.run(&self.roles).await
    }

    /// Load `role_id` and resolve the scope. An unknown role grants nothing.
    pub async fn authorize(
        &self,
        role_id: &RoleId,
        network_id: &NetworkId,
        resource_type: &ResourceType,
        resource_id: &ResourceId,
        operation: &str,
    ) -> RbacResult<bool> {
        let template = match self.roles.get(role_id).await {
            Ok(template) => template,
            Err(err) if err.is_not_found() => return Ok(false),
            Err(err) => return Err(err),
        };
        Ok(self.resolver.has_network_resource_scope(
            &template,
            network_id,
            resource_type,
            resource_id,
            operation,
        ))
    }
}
