//! Network resource scope decisions.
//!
//! # Purpose
//! Answers whether a role template grants an operation on one resource instance.
//!
//! # Modes
//! - [`ScopeCheck::Presence`] (default): a template grants any operation on a resource instance it
//!   lists, whatever the instance's scope flags say.
//! - [`ScopeCheck::Operation`]: the listed instance (or the `*` instance of the same type) must
//!   have the requested operation's flag set.
//!
//! # Key invariants
//! - `full_access` grants everything in both modes.
//! - Missing data always denies; the resolver never fails.
//! - The network id is not consulted. Templates are not network-specific; role assignment is.
use crate::model::{Operation, UserRolePermissionTemplate};
use crate::types::{NetworkId, ResourceId, ResourceType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeCheck {
    #[default]
    Presence,
    Operation,
}

impl ScopeCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeCheck::Presence => "presence",
            ScopeCheck::Operation => "operation",
        }
    }
}

impl std::fmt::Display for ScopeCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScopeCheck {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "presence" => Ok(ScopeCheck::Presence),
            "operation" => Ok(ScopeCheck::Operation),
            other => Err(format!("unknown scope check mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessResolver {
    mode: ScopeCheck,
}

impl AccessResolver {
    pub fn new(mode: ScopeCheck) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ScopeCheck {
        self.mode
    }

    pub fn has_network_resource_scope(
        &self,
        template: &UserRolePermissionTemplate,
        _network_id: &NetworkId,
        resource_type: &ResourceType,
        resource_id: &ResourceId,
        operation: &str,
    ) -> bool {
        if template.full_access {
            return true;
        }
        let Some(scopes) = template.network_level_access.get(resource_type) else {
            return false;
        };
        match self.mode {
            ScopeCheck::Presence => scopes.contains_key(resource_id),
            ScopeCheck::Operation => {
                let Ok(operation) = operation.parse::<Operation>() else {
                    return false;
                };
                scopes
                    .get(resource_id)
                    .or_else(|| scopes.get(ResourceId::ALL_RESOURCES))
                    .is_some_and(|scope| scope.allows(operation))
            }
        }
    }
}

/// Presence-mode check; see [`AccessResolver`].
pub fn has_network_resource_scope(
    template: &UserRolePermissionTemplate,
    network_id: &NetworkId,
    resource_type: &ResourceType,
    resource_id: &ResourceId,
    operation: &str,
) -> bool {
    AccessResolver::default().has_network_resource_scope(
        template,
        network_id,
        resource_type,
        resource_id,
        operation,
    )
}
