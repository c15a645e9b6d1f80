//! Referential integrity checks run before a role is deleted.
//!
//! # Purpose
//! A role may only be deleted when no user references it: not as the platform role, not as a
//! directly assigned network role, and not through any group the user belongs to.
//!
//! # Cost
//! One full pass over the user directory per check, plus one group lookup per distinct group
//! seen during the pass. Role deletion is an administrative operation, so the linear scan is
//! acceptable; there is no reverse index.
//!
//! # Key invariants
//! - Users are checked in directory order; per user the group check runs first, then the platform
//!   role, then direct network roles. The first hit wins.
//! - A group that cannot be loaded (dangling reference, decode failure) does not block deletion.
use crate::directory::UserDirectory;
use crate::errors::{RbacError, RbacResult, RoleReference};
use crate::model::{UserGroup, network_granting};
use crate::registry::Registry;
use crate::types::{GroupId, RoleId};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReferentialIntegrityGuard {
    users: Arc<dyn UserDirectory>,
    groups: Registry<UserGroup>,
}

impl ReferentialIntegrityGuard {
    pub fn new(users: Arc<dyn UserDirectory>, groups: Registry<UserGroup>) -> Self {
        Self { users, groups }
    }

    /// Fail with [`RbacError::RoleInUse`] if any user still references `role_id`.
    pub async fn ensure_role_unreferenced(&self, role_id: &RoleId) -> RbacResult<()> {
        let users = self.users.list_all_users().await?;
        let mut groups: HashMap<GroupId, Option<UserGroup>> = HashMap::new();

        for user in users {
            for group_id in &user.user_groups {
                if !groups.contains_key(group_id) {
                    let group = match self.groups.get(group_id.as_str()).await {
                        Ok(group) => Some(group),
                        Err(err) => {
                            tracing::debug!(
                                group = %group_id,
                                user = %user.user_name,
                                error = %err,
                                "ignoring unreadable group during role reference scan"
                            );
                            None
                        }
                    };
                    groups.insert(group_id.clone(), group);
                }
                if let Some(Some(group)) = groups.get(group_id)
                    && let Some(network) = group.grants_role(role_id)
                {
                    return Err(in_use(
                        role_id,
                        RoleReference::Group {
                            user: user.user_name.clone(),
                            group: group_id.clone(),
                            network: network.clone(),
                        },
                    ));
                }
            }

            if &user.platform_role_id == role_id {
                return Err(in_use(
                    role_id,
                    RoleReference::PlatformRole {
                        user: user.user_name.clone(),
                    },
                ));
            }

            if let Some(network) = network_granting(&user.network_roles, role_id) {
                return Err(in_use(
                    role_id,
                    RoleReference::NetworkRole {
                        user: user.user_name.clone(),
                        network: network.clone(),
                    },
                ));
            }
        }
        Ok(())
    }
}

fn in_use(role_id: &RoleId, reference: RoleReference) -> RbacError {
    metrics::counter!("netgate_rbac_role_delete_blocked_total").increment(1);
    tracing::info!(
        role = %role_id,
        user = %reference.user(),
        reason = reference.message(),
        "role deletion blocked"
    );
    RbacError::RoleInUse {
        role_id: role_id.clone(),
        reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RecordUserDirectory;
    use crate::model::User;
    use crate::types::{NetworkId, UserName};
    use netgate_store::InMemoryRecordStore;

    async fn guard_with(users: Vec<User>, groups: Vec<UserGroup>) -> ReferentialIntegrityGuard {
        let store: Arc<dyn netgate_store::RecordStore> = Arc::new(InMemoryRecordStore::new());
        let directory = RecordUserDirectory::new(store.clone());
        for user in users {
            directory.upsert_user(user).await.expect("seed user");
        }
        let registry = Registry::new(store);
        for group in groups {
            registry.create(group).await.expect("seed group");
        }
        ReferentialIntegrityGuard::new(Arc::new(directory), registry)
    }

    #[tokio::test]
    async fn unreferenced_role_passes() {
        let guard = guard_with(
            vec![User::new("alice", "admin").with_network_role("net1", "network-user")],
            vec![UserGroup::new("ops").with_network_role("net1", "network-admin")],
        )
        .await;
        guard
            .ensure_role_unreferenced(&RoleId::new("auditor"))
            .await
            .expect("unreferenced");
    }

    #[tokio::test]
    async fn group_reference_is_reported_first() {
        let guard = guard_with(
            vec![User::new("alice", "auditor").with_group("ops")],
            vec![UserGroup::new("ops").with_network_role("net1", "auditor")],
        )
        .await;
        let err = guard
            .ensure_role_unreferenced(&RoleId::new("auditor"))
            .await
            .expect_err("in use");
        match err {
            RbacError::RoleInUse { role_id, reference } => {
                assert_eq!(role_id.as_str(), "auditor");
                assert_eq!(
                    reference,
                    RoleReference::Group {
                        user: UserName::new("alice"),
                        group: GroupId::new("ops"),
                        network: NetworkId::new("net1"),
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn direct_references_block() {
        let guard = guard_with(
            vec![
                User::new("alice", "admin"),
                User::new("bob", "network-user").with_network_role("net2", "auditor"),
            ],
            Vec::new(),
        )
        .await;

        let err = guard
            .ensure_role_unreferenced(&RoleId::new("network-user"))
            .await
            .expect_err("platform role");
        assert!(matches!(
            err,
            RbacError::RoleInUse {
                reference: RoleReference::PlatformRole { .. },
                ..
            }
        ));

        let err = guard
            .ensure_role_unreferenced(&RoleId::new("auditor"))
            .await
            .expect_err("network role");
        assert!(matches!(
            err,
            RbacError::RoleInUse {
                reference: RoleReference::NetworkRole { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dangling_group_does_not_block() {
        let guard = guard_with(
            vec![User::new("alice", "admin").with_group("deleted-group")],
            Vec::new(),
        )
        .await;
        guard
            .ensure_role_unreferenced(&RoleId::new("auditor"))
            .await
            .expect("dangling group ignored");
    }
}
