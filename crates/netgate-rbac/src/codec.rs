//! Record payload encoding.
//!
//! # Purpose
//! Binds each persisted entity to its table, its key and its string payload format so the
//! registries never touch `serde_json` directly.
//!
//! # Key invariants
//! - The payload is JSON; the key is the entity id and is never derived from the payload.
//! - Encode and decode failures carry the entity kind for diagnostics.
use crate::errors::{RbacError, RbacResult};
use crate::model::{User, UserGroup, UserRolePermissionTemplate};
use netgate_store::Table;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity stored in one table of the record store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Table the record lives in.
    const TABLE: Table;
    /// Human readable noun used in errors and logs.
    const KIND: &'static str;

    fn record_key(&self) -> &str;

    fn encode(&self) -> RbacResult<String> {
        serde_json::to_string(self).map_err(|source| RbacError::Encode {
            kind: Self::KIND,
            source,
        })
    }

    fn decode(payload: &str) -> RbacResult<Self> {
        serde_json::from_str(payload).map_err(|source| RbacError::Decode {
            kind: Self::KIND,
            source,
        })
    }
}

macro_rules! derive_record {
    ($($name:ident => $table:expr, $kind:literal, $key:ident);+ $(;)?) => {
        $(
            impl Record for $name {
                const TABLE: Table = $table;
                const KIND: &'static str = $kind;

                fn record_key(&self) -> &str {
                    self.$key.as_str()
                }
            }
        )+
    };
}

derive_record! {
    UserRolePermissionTemplate => Table::UserPermissions, "role", id;
    UserGroup => Table::UserGroups, "group", id;
    User => Table::Users, "user", user_name;
}
