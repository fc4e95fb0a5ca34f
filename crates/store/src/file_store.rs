//! File-based store — persistent JSON-lines storage.
//!
//! Each collection lives in its own file, `{data_dir}/{collection}.jsonl`,
//! one JSON-encoded record per line. Records are loaded into memory on
//! creation and the whole file is rewritten on every mutation, which keeps
//! reads fast and the file human-inspectable.

use async_trait::async_trait;
use policydraft_core::error::StoreError;
use policydraft_core::store::{Record, Store};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::in_memory::upsert;

/// A file-backed record store using JSONL (one JSON object per line).
pub struct FileStore<T> {
    path: PathBuf,
    records: Arc<RwLock<Vec<T>>>,
}

impl<T: Record> FileStore<T> {
    /// Open a store at the given file path.
    ///
    /// If the file exists, records are loaded from it.
    /// If it does not, the store starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(
            collection = T::COLLECTION,
            path = %path.display(),
            count = records.len(),
            "File store loaded"
        );
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Open the collection file for `T` inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(format!("{}.jsonl", T::COLLECTION)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Vec<T> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let mut records = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str::<T>(line) {
                Ok(record) => upsert(&mut records, record),
                Err(e) => {
                    warn!(collection = T::COLLECTION, error = %e, "Skipping corrupted record");
                }
            }
        }
        records
    }

    /// Rewrite the collection file from the given snapshot.
    fn flush(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create data directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in records {
            let line = serde_json::to_string(record).map_err(|e| StoreError::Corrupted {
                collection: T::COLLECTION.into(),
                reason: e.to_string(),
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| StoreError::Storage(format!("Failed to write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl<T: Record> Store<T> for FileStore<T> {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn put(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let mut next = records.clone();
        upsert(&mut next, record);
        // Flush under the write lock so the file never lags a later put,
        // and publish only what reached disk.
        self.flush(&next)?;
        *records = next;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        if !records.iter().any(|r| r.id() == id) {
            return Ok(false);
        }
        let next: Vec<T> = records.iter().filter(|r| r.id() != id).cloned().collect();
        self.flush(&next)?;
        *records = next;
        Ok(true)
    }

    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}
