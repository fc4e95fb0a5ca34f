//! Store trait — id-keyed persistence for templates, policies and documents.
//!
//! The persistence mechanism is the host's choice. Services receive an
//! `Arc<dyn Store<T>>` and never reach for a global.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use crate::error::StoreError;

/// A record that can be kept in a [`Store`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, used for file names and log fields.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// The core Store trait.
///
/// Implementations: in-memory (for testing), JSON-lines file.
/// A `put` replaces the whole record atomically; concurrent writers to the
/// same id resolve as last-write-wins.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Fetch a record by id.
    async fn get(&self, id: &str) -> std::result::Result<Option<T>, StoreError>;

    /// Insert or replace a record.
    async fn put(&self, record: T) -> std::result::Result<(), StoreError>;

    /// Delete a record. Returns whether it existed.
    async fn delete(&self, id: &str) -> std::result::Result<bool, StoreError>;

    /// All records, in insertion order.
    async fn list(&self) -> std::result::Result<Vec<T>, StoreError>;
}
