//! User group registry and membership cascade.
//!
//! # Purpose
//! Stores [`UserGroup`] records. Membership lives on users, so deleting a group walks the whole
//! user directory and removes the group id from every member before removing the group itself.
//!
//! # Cascade semantics
//! - Each step is "remove the reference if present, then upsert the user". Re-running a delete
//!   after a partial failure repeats only the steps that still have work to do.
//! - A failed user upsert is logged, counted and reported in [`GroupCascade`]; it does not stop
//!   the cascade, and the group record is deleted anyway.
//! - Users left with a dangling group id are harmless: unknown groups grant nothing.
use crate::directory::UserDirectory;
use crate::errors::{RbacError, RbacResult};
use crate::model::UserGroup;
use crate::registry::Registry;
use crate::types::{GroupId, UserName};
use netgate_store::RecordStore;
use std::sync::Arc;

/// Outcome of a group deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupCascade {
    pub group_id: GroupId,
    /// Members whose records were rewritten without the group.
    pub users_updated: Vec<UserName>,
    /// Members whose rewrite failed and still reference the group.
    pub users_failed: Vec<UserName>,
}

impl GroupCascade {
    pub fn is_complete(&self) -> bool {
        self.users_failed.is_empty()
    }
}

#[derive(Clone)]
pub struct GroupRegistry {
    groups: Registry<UserGroup>,
    users: Arc<dyn UserDirectory>,
}

impl GroupRegistry {
    pub fn new(store: Arc<dyn RecordStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self {
            groups: Registry::new(store),
            users,
        }
    }

    pub async fn list(&self) -> RbacResult<Vec<UserGroup>> {
        self.groups.list().await
    }

    pub async fn create(&self, group: UserGroup) -> RbacResult<UserGroup> {
        self.groups.create(group).await
    }

    pub async fn get(&self, group_id: &GroupId) -> RbacResult<UserGroup> {
        self.groups.get(group_id.as_str()).await
    }

    pub async fn update(&self, group: UserGroup) -> RbacResult<UserGroup> {
        self.groups.update(group).await
    }

    pub async fn delete(&self, group_id: &GroupId) -> RbacResult<GroupCascade> {
        if group_id.is_empty() {
            return Err(RbacError::InvalidInput("group id cannot be empty".to_string()));
        }
        let users = self.users.list_all_users().await?;

        let mut cascade = GroupCascade {
            group_id: group_id.clone(),
            ..GroupCascade::default()
        };
        for mut user in users {
            if !user.leave_group(group_id) {
                continue;
            }
            let user_name = user.user_name.clone();
            match self.users.upsert_user(user).await {
                Ok(()) => cascade.users_updated.push(user_name),
                Err(err) => {
                    tracing::warn!(
                        group = %group_id,
                        user = %user_name,
                        error = %err,
                        "failed to remove group membership"
                    );
                    metrics::counter!("netgate_rbac_group_cascade_failures_total").increment(1);
                    cascade.users_failed.push(user_name);
                }
            }
        }

        self.groups.remove(group_id.as_str()).await?;
        tracing::info!(
            group = %group_id,
            updated = cascade.users_updated.len(),
            failed = cascade.users_failed.len(),
            "group deleted"
        );
        Ok(cascade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::RecordUserDirectory;
    use crate::model::User;
    use netgate_store::{InMemoryRecordStore, Table};

    fn registry() -> (InMemoryRecordStore, RecordUserDirectory, GroupRegistry) {
        let store = InMemoryRecordStore::new();
        let shared: Arc<dyn RecordStore> = Arc::new(store.clone());
        let users = RecordUserDirectory::new(shared.clone());
        let groups = GroupRegistry::new(shared, Arc::new(users.clone()));
        (store, users, groups)
    }

    #[tokio::test]
    async fn crud_contracts() {
        let (store, _users, groups) = registry();
        let err = groups
            .create(UserGroup::new(""))
            .await
            .expect_err("empty id");
        assert!(matches!(err, RbacError::InvalidInput(_)));
        assert!(store.is_empty(Table::UserGroups).await);

        let group = UserGroup {
            meta_data: "operators".to_string(),
            ..UserGroup::new("ops").with_network_role("net1", "network-admin")
        };
        groups.create(group.clone()).await.expect("create");
        assert_eq!(groups.get(&GroupId::new("ops")).await.expect("get"), group);
        assert!(matches!(
            groups.create(group.clone()).await.expect_err("duplicate"),
            RbacError::AlreadyExists { .. }
        ));

        let replacement = UserGroup::new("ops");
        groups.update(replacement.clone()).await.expect("update");
        let stored = groups.get(&GroupId::new("ops")).await.expect("get");
        assert_eq!(stored, replacement);
        assert!(stored.network_roles.is_empty());

        assert!(
            groups
                .update(UserGroup::new("ghost"))
                .await
                .expect_err("missing")
                .is_not_found()
        );
        assert_eq!(groups.list().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_membership_from_every_user() {
        let (_store, users, groups) = registry();
        groups.create(UserGroup::new("ops")).await.expect("create");
        users
            .upsert_user(User::new("alice", "admin").with_group("ops").with_group("dev"))
            .await
            .expect("alice");
        users
            .upsert_user(User::new("bob", "admin").with_group("ops"))
            .await
            .expect("bob");
        users
            .upsert_user(User::new("carol", "admin").with_group("dev"))
            .await
            .expect("carol");

        let cascade = groups.delete(&GroupId::new("ops")).await.expect("delete");
        assert!(cascade.is_complete());
        assert_eq!(
            cascade.users_updated,
            vec![UserName::new("alice"), UserName::new("bob")]
        );

        for user in users.list_all_users().await.expect("users") {
            assert!(!user.user_groups.contains(&GroupId::new("ops")));
        }
        let alice = users.get_user(&UserName::new("alice")).await.expect("alice");
        assert!(alice.user_groups.contains(&GroupId::new("dev")));
        assert!(
            groups
                .get(&GroupId::new("ops"))
                .await
                .expect_err("group deleted")
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn delete_without_members_still_removes_group() {
        let (_store, _users, groups) = registry();
        groups.create(UserGroup::new("empty")).await.expect("create");
        let cascade = groups.delete(&GroupId::new("empty")).await.expect("delete");
        assert!(cascade.users_updated.is_empty());
        assert!(groups.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_empty_id_is_invalid() {
        let (_store, _users, groups) = registry();
        let err = groups
            .delete(&GroupId::new(""))
            .await
            .expect_err("empty id");
        assert!(matches!(err, RbacError::InvalidInput(_)));
    }
}
