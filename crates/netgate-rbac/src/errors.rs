use crate::types::{GroupId, NetworkId, RoleId, UserName};
use netgate_store::StoreError;
use thiserror::Error;

pub const GROUP_ROLE_IN_USE: &str =
    "role cannot be deleted as active user groups are using this role";
pub const USER_ROLE_IN_USE: &str =
    "active roles cannot be deleted. switch existing users to a new role before deleting";

/// Where a role that blocks deletion is still referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleReference {
    /// A group the user belongs to grants the role in `network`.
    Group {
        user: UserName,
        group: GroupId,
        network: NetworkId,
    },
    /// The user's platform role.
    PlatformRole { user: UserName },
    /// A network role assigned directly to the user.
    NetworkRole { user: UserName, network: NetworkId },
}

impl RoleReference {
    pub fn message(&self) -> &'static str {
        match self {
            RoleReference::Group { .. } => GROUP_ROLE_IN_USE,
            RoleReference::PlatformRole { .. } | RoleReference::NetworkRole { .. } => {
                USER_ROLE_IN_USE
            }
        }
    }

    pub fn user(&self) -> &UserName {
        match self {
            RoleReference::Group { user, .. }
            | RoleReference::PlatformRole { user }
            | RoleReference::NetworkRole { user, .. } => user,
        }
    }
}

impl std::fmt::Display for RoleReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{reference}")]
    RoleInUse {
        role_id: RoleId,
        reference: RoleReference,
    },
    #[error("failed to decode {kind} record: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {kind} record: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RbacError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RbacError::NotFound { .. })
    }
}

pub type RbacResult<T> = Result<T, RbacError>;
