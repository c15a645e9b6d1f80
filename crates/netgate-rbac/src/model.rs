//! Permission templates, user groups and users.
//!
//! # Purpose
//! Defines the records the registries persist and the resolver reads.
//!
//! # Key invariants
//! - A persisted template or group never has an empty `id`.
//! - Absent resource types or instance ids in `network_level_access` mean "no access".
//! - Every field has a default, so older payloads missing a field still decode.
//!
//! # Examples
//! ```rust
//! use netgate_rbac::{ResourceId, ResourceType, RsrcPermissionScope, UserRolePermissionTemplate};
//!
//! let template = UserRolePermissionTemplate::new("gw-reader").grant(
//!     ResourceType::new("remote_access_gw"),
//!     ResourceId::all(),
//!     RsrcPermissionScope::read_only(),
//! );
//! assert!(template.network_level_access.contains_key("remote_access_gw"));
//! ```
use crate::types::{GroupId, NetworkId, ResourceId, ResourceType, RoleId, UserName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Resource type names used by the control plane.
pub mod resource {
    pub const VPN: &str = "vpn";
    pub const HOSTS: &str = "hosts";
    pub const RELAYS: &str = "relays";
    pub const REMOTE_ACCESS_GW: &str = "remote_access_gw";
    pub const EXT_CLIENTS: &str = "extclients";
    pub const INET_GW: &str = "inet_gw";
    pub const EGRESS: &str = "egress";
    pub const NETWORKS: &str = "networks";
    pub const ENROLLMENT_KEYS: &str = "enrollment_key";
    pub const USERS: &str = "users";
    pub const ACLS: &str = "acl";
    pub const DNS: &str = "dns";
    pub const FAIL_OVER: &str = "fail_over";

    pub const ALL: [&str; 13] = [
        VPN,
        HOSTS,
        RELAYS,
        REMOTE_ACCESS_GW,
        EXT_CLIENTS,
        INET_GW,
        EGRESS,
        NETWORKS,
        ENROLLMENT_KEYS,
        USERS,
        ACLS,
        DNS,
        FAIL_OVER,
    ];
}

/// Operation requested against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }

    /// Map an HTTP method onto the operation it performs.
    pub fn from_http_method(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" => Some(Operation::Read),
            "POST" => Some(Operation::Create),
            "PUT" | "PATCH" => Some(Operation::Update),
            "DELETE" => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operation {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "create" => Ok(Operation::Create),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            _ => Operation::from_http_method(value).ok_or(()),
        }
    }
}

/// Operations granted on one resource instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsrcPermissionScope {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl RsrcPermissionScope {
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    pub fn all() -> Self {
        Self {
            create: true,
            read: true,
            update: true,
            delete: true,
        }
    }

    pub fn allows(&self, operation: Operation) -> bool {
        match operation {
            Operation::Read => self.read,
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// Instance id -> granted scope, for one resource type.
pub type ResourceScopes = BTreeMap<ResourceId, RsrcPermissionScope>;

/// Resource type -> instance scopes.
pub type NetworkLevelAccess = BTreeMap<ResourceType, ResourceScopes>;

/// Network -> roles granted in that network.
pub type NetworkRoles = BTreeMap<NetworkId, BTreeSet<RoleId>>;

/// Return the first network whose role set contains `role_id`.
pub fn network_granting<'a>(roles: &'a NetworkRoles, role_id: &RoleId) -> Option<&'a NetworkId> {
    roles
        .iter()
        .find(|(_, granted)| granted.contains(role_id))
        .map(|(network, _)| network)
}

/// One assignable permission set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserRolePermissionTemplate {
    pub id: RoleId,
    pub default: bool,
    pub full_access: bool,
    pub is_network_role: bool,
    pub deny_dashboard_access: bool,
    pub network_level_access: NetworkLevelAccess,
}

impl UserRolePermissionTemplate {
    pub fn new(id: impl Into<RoleId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Add (or replace) the scope for one resource instance.
    pub fn grant(
        mut self,
        resource_type: ResourceType,
        resource_id: ResourceId,
        scope: RsrcPermissionScope,
    ) -> Self {
        self.network_level_access
            .entry(resource_type)
            .or_default()
            .insert(resource_id, scope);
        self
    }
}

/// A named bundle of network roles applied to every member.
///
/// Membership lives on [`User::user_groups`], not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserGroup {
    pub id: GroupId,
    pub network_roles: NetworkRoles,
    pub meta_data: String,
}

impl UserGroup {
    pub fn new(id: impl Into<GroupId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_network_role(
        mut self,
        network: impl Into<NetworkId>,
        role: impl Into<RoleId>,
    ) -> Self {
        self.network_roles
            .entry(network.into())
            .or_default()
            .insert(role.into());
        self
    }

    pub fn grants_role(&self, role_id: &RoleId) -> Option<&NetworkId> {
        network_granting(&self.network_roles, role_id)
    }
}

/// A user record as owned by the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub user_name: UserName,
    pub platform_role_id: RoleId,
    pub network_roles: NetworkRoles,
    pub user_groups: BTreeSet<GroupId>,
}

impl User {
    pub fn new(user_name: impl Into<UserName>, platform_role_id: impl Into<RoleId>) -> Self {
        Self {
            user_name: user_name.into(),
            platform_role_id: platform_role_id.into(),
            ..Self::default()
        }
    }

    pub fn with_network_role(
        mut self,
        network: impl Into<NetworkId>,
        role: impl Into<RoleId>,
    ) -> Self {
        self.network_roles
            .entry(network.into())
            .or_default()
            .insert(role.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<GroupId>) -> Self {
        self.user_groups.insert(group.into());
        self
    }

    /// Remove a group reference. Returns whether the user was a member.
    pub fn leave_group(&mut self, group_id: &GroupId) -> bool {
        self.user_groups.remove(group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_parsing_accepts_names_and_http_methods() {
        assert_eq!("read".parse::<Operation>(), Ok(Operation::Read));
        assert_eq!("DELETE".parse::<Operation>(), Ok(Operation::Delete));
        assert_eq!("patch".parse::<Operation>(), Ok(Operation::Update));
        assert_eq!("POST".parse::<Operation>(), Ok(Operation::Create));
        assert!("write".parse::<Operation>().is_err());
        assert_eq!(Operation::from_http_method("get"), Some(Operation::Read));
        assert_eq!(Operation::from_http_method("OPTIONS"), None);
    }

    #[test]
    fn scope_allows_only_enumerated_operations() {
        let scope = RsrcPermissionScope::read_only();
        assert!(scope.allows(Operation::Read));
        assert!(!scope.allows(Operation::Create));
        assert!(!scope.allows(Operation::Update));
        assert!(!scope.allows(Operation::Delete));
        let all = RsrcPermissionScope::all();
        assert!(all.allows(Operation::Delete));
    }

    #[test]
    fn template_decodes_with_missing_fields() {
        let template: UserRolePermissionTemplate =
            serde_json::from_str(r#"{"id":"viewer","full_access":true}"#).expect("decode");
        assert_eq!(template.id.as_str(), "viewer");
        assert!(template.full_access);
        assert!(!template.default);
        assert!(template.network_level_access.is_empty());
    }

    #[test]
    fn template_json_shape() {
        let template = UserRolePermissionTemplate::new("net-user").grant(
            ResourceType::new(resource::REMOTE_ACCESS_GW),
            ResourceId::all(),
            RsrcPermissionScope::read_only(),
        );
        let value = serde_json::to_value(&template).expect("encode");
        assert_eq!(value["id"], "net-user");
        assert_eq!(
            value["network_level_access"]["remote_access_gw"]["*"]["read"],
            true
        );
        assert_eq!(
            value["network_level_access"]["remote_access_gw"]["*"]["delete"],
            false
        );
    }

    #[test]
    fn group_and_user_role_lookups() {
        let group = UserGroup::new("ops").with_network_role("net1", "network-admin");
        assert_eq!(
            group.grants_role(&RoleId::new("network-admin")),
            Some(&NetworkId::new("net1"))
        );
        assert_eq!(group.grants_role(&RoleId::new("admin")), None);

        let mut user = User::new("alice", "admin")
            .with_network_role("net2", "network-user")
            .with_group("ops");
        assert_eq!(
            network_granting(&user.network_roles, &RoleId::new("network-user")),
            Some(&NetworkId::new("net2"))
        );
        assert!(user.leave_group(&GroupId::new("ops")));
        assert!(!user.leave_group(&GroupId::new("ops")));
    }

    #[test]
    fn resource_type_catalog_is_unique() {
        let unique: BTreeSet<_> = resource::ALL.iter().collect();
        assert_eq!(unique.len(), resource::ALL.len());
    }
}
