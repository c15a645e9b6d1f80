//! Generic CRUD over one record table.
//!
//! # Purpose
//! The role and group registries share the same contracts for create, get, list and update.
//! [`Registry`] implements them once on top of [`RecordStore`] and a [`Record`] codec.
//!
//! # Key invariants
//! - `create` and `update` reject an empty id with [`RbacError::InvalidInput`] before any I/O.
//! - `create` never overwrites; `update` never creates.
//! - `list` skips records that fail to decode; `get` surfaces the decode error.
//!
//! # Concurrency
//! The existence probe and the write are two store calls. Concurrent creators of the same id can
//! both pass the probe; the later write wins. Callers serialize administrative mutations.
use crate::codec::Record;
use crate::errors::{RbacError, RbacResult};
use netgate_store::RecordStore;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct Registry<T> {
    store: Arc<dyn RecordStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Registry<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn require_id(id: &str) -> RbacResult<()> {
        if id.is_empty() {
            return Err(RbacError::InvalidInput(format!("{} id cannot be empty", T::KIND)));
        }
        Ok(())
    }

    /// Decode every record in the table, skipping malformed payloads.
    pub async fn list(&self) -> RbacResult<Vec<T>> {
        let payloads = self.store.fetch_all(T::TABLE).await?;
        let mut records = Vec::with_capacity(payloads.len());
        for payload in payloads {
            match T::decode(&payload) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        table = T::TABLE.as_str(),
                        error = %err,
                        "skipping malformed record"
                    );
                    metrics::counter!(
                        "netgate_rbac_records_skipped_total",
                        "table" => T::TABLE.as_str()
                    )
                    .increment(1);
                }
            }
        }
        Ok(records)
    }

    pub async fn exists(&self, id: &str) -> RbacResult<bool> {
        match self.store.fetch_one(T::TABLE, id).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn create(&self, record: T) -> RbacResult<T> {
        let id = record.record_key();
        Self::require_id(id)?;
        if self.exists(id).await? {
            return Err(RbacError::AlreadyExists {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        self.put(&record).await?;
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> RbacResult<T> {
        let payload = match self.store.fetch_one(T::TABLE, id).await {
            Ok(payload) => payload,
            Err(err) if err.is_not_found() => {
                return Err(RbacError::NotFound {
                    kind: T::KIND,
                    id: id.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        T::decode(&payload)
    }

    pub async fn update(&self, record: T) -> RbacResult<T> {
        let id = record.record_key();
        Self::require_id(id)?;
        if !self.exists(id).await? {
            return Err(RbacError::NotFound {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        self.put(&record).await?;
        Ok(record)
    }

    /// Write the record unconditionally (upsert).
    pub async fn put(&self, record: &T) -> RbacResult<()> {
        let id = record.record_key();
        Self::require_id(id)?;
        let payload = record.encode()?;
        self.store.insert(id, &payload, T::TABLE).await?;
        Ok(())
    }

    /// Remove the record. Missing records are not an error.
    pub async fn remove(&self, id: &str) -> RbacResult<()> {
        Self::require_id(id)?;
        self.store.delete(T::TABLE, id).await?;
        Ok(())
    }
}
