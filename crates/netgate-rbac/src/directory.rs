//! User directory collaborator.
//!
//! # Purpose
//! Group deletion and the referential integrity guard need to enumerate users and write back
//! membership changes. They do it through [`UserDirectory`] so the owner of user records can stay
//! outside this crate.
//!
//! # Key invariants
//! - `list_all_users` returns every user the directory can decode; malformed entries are omitted.
//! - `upsert_user` replaces the whole user record.
use crate::errors::RbacResult;
use crate::model::User;
use crate::registry::Registry;
use crate::types::UserName;
use async_trait::async_trait;
use netgate_store::RecordStore;
use std::sync::Arc;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_all_users(&self) -> RbacResult<Vec<User>>;
    async fn upsert_user(&self, user: User) -> RbacResult<()>;
}

/// Directory that keeps users in the record store's `users` table.
#[derive(Clone)]
pub struct RecordUserDirectory {
    users: Registry<User>,
}

impl RecordUserDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            users: Registry::new(store),
        }
    }

    pub async fn get_user(&self, user_name: &UserName) -> RbacResult<User> {
        self.users.get(user_name.as_str()).await
    }

    pub async fn delete_user(&self, user_name: &UserName) -> RbacResult<()> {
        self.users.remove(user_name.as_str()).await
    }
}

#[async_trait]
impl UserDirectory for RecordUserDirectory {
    async fn list_all_users(&self) -> RbacResult<Vec<User>> {
        self.users.list().await
    }

    async fn upsert_user(&self, user: User) -> RbacResult<()> {
        self.users.put(&user).await
    }
}
