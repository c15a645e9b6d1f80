//! Strongly typed identifiers for RBAC entities.
//!
//! # Purpose
//! Wraps string identifiers so role, group, network, user and resource ids cannot be swapped by
//! accident when they flow through registries and the resolver.
//!
//! # Key invariants
//! - Each wrapper serializes as the bare inner string.
//! - `Display` and `as_str` return the original value.
//! - Emptiness is not checked here; registries reject empty ids at their boundary.
//!
//! # Examples
//! ```rust
//! use netgate_rbac::{NetworkId, RoleId};
//!
//! let role = RoleId::new("network-user");
//! let network = NetworkId::new("net1");
//! assert_eq!(format!("{network}/{role}"), "net1/network-user");
//! ```
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Role (permission template) identifier, e.g. `super-admin`.
    RoleId
);
string_id!(
    /// User group identifier.
    GroupId
);
string_id!(
    /// Network identifier that scopes network roles.
    NetworkId
);
string_id!(
    /// User name; the primary key of user records.
    UserName
);
string_id!(
    /// Kind of network resource a scope applies to, e.g. `remote_access_gw`.
    ResourceType
);
string_id!(
    /// Concrete resource instance id, or [`ResourceId::ALL_RESOURCES`].
    ResourceId
);

impl ResourceId {
    /// Reserved instance id that stands for every instance of a resource type.
    pub const ALL_RESOURCES: &str = "*";

    pub fn all() -> Self {
        Self::new(Self::ALL_RESOURCES)
    }

    pub fn is_all(&self) -> bool {
        self.0 == Self::ALL_RESOURCES
    }
}
