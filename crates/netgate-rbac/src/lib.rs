//! Role-based access control for the netgate control plane.
//!
//! # Purpose
//! Defines platform and per-network permission roles, user groups that grant network roles to
//! their members, and the resolver that decides whether a role may perform an operation on a
//! network resource.
//!
//! # How it fits
//! The admin API calls the registries; role deletion runs the referential integrity guard first;
//! protected operations ask the resolver. Persistence goes through [`netgate_store::RecordStore`]
//! and user records through a [`UserDirectory`].
//!
//! # Key invariants
//! - Role and group ids are unique and never empty once persisted.
//! - A role referenced by any user, directly or through a joined group, cannot be deleted.
//! - Deleting a group removes it from every member first, then removes the group.
//! - Missing data in the resolver always denies.
//!
//! # Examples
//! ```rust
//! use netgate_rbac::{
//!     NetworkId, ResourceId, ResourceType, RsrcPermissionScope, UserRolePermissionTemplate,
//!     has_network_resource_scope,
//! };
//!
//! let template = UserRolePermissionTemplate::new("net-user").grant(
//!     ResourceType::new("remote_access_gw"),
//!     ResourceId::all(),
//!     RsrcPermissionScope::read_only(),
//! );
//! assert!(has_network_resource_scope(
//!     &template,
//!     &NetworkId::new("net1"),
//!     &ResourceType::new("remote_access_gw"),
//!     &ResourceId::all(),
//!     "read",
//! ));
//! ```
//!
//! # Common pitfalls
//! - Administrative mutations are not serialized here; run them through one writer.
//! - The default resolver mode ignores the requested operation once a resource instance is
//!   listed. Use [`ScopeCheck::Operation`] to check the scope flags.

mod bootstrap;
mod codec;
mod defaults;
mod directory;
mod errors;
mod groups;
mod guard;
mod model;
mod rbac;
mod registry;
mod resolver;
mod roles;
mod types;

pub use bootstrap::{BootstrapGate, BootstrapOutcome};
pub use codec::Record;
pub use defaults::{
    ADMIN_ROLE, NETWORK_ADMIN_ROLE, NETWORK_USER_ROLE, SUPER_ADMIN_ROLE, admin_template,
    default_templates, network_admin_template, network_user_template, super_admin_template,
};
pub use directory::{RecordUserDirectory, UserDirectory};
pub use errors::{GROUP_ROLE_IN_USE, RbacError, RbacResult, RoleReference, USER_ROLE_IN_USE};
pub use groups::{GroupCascade, GroupRegistry};
pub use guard::ReferentialIntegrityGuard;
pub use model::{
    NetworkLevelAccess, NetworkRoles, Operation, ResourceScopes, RsrcPermissionScope, User,
    UserGroup, UserRolePermissionTemplate, network_granting, resource,
};
pub use rbac::Rbac;
pub use registry::Registry;
pub use resolver::{AccessResolver, ScopeCheck, has_network_resource_scope};
pub use roles::RoleRegistry;
pub use types::{GroupId, NetworkId, ResourceId, ResourceType, RoleId, UserName};
