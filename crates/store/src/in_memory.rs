//! In-memory store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use policydraft_core::error::StoreError;
use policydraft_core::store::{Record, Store};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store that keeps records in a Vec, in insertion order.
/// Useful for testing and sessions where persistence isn't needed.
pub struct InMemoryStore<T> {
    records: Arc<RwLock<Vec<T>>>,
}

impl<T> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the record with the same id in place, or append it.
pub(crate) fn upsert<T: Record>(records: &mut Vec<T>, record: T) {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => *slot = record,
        None => records.push(record),
    }
}

#[async_trait]
impl<T: Record> Store<T> for InMemoryStore<T> {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn put(&self, record: T) -> Result<(), StoreError> {
        upsert(&mut *self.records.write().await, record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        let len_before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() < len_before)
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
