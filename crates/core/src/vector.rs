//! Vector index trait — similarity search over embedded policy chunks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::IndexError;
use crate::policy::PolicyChunk;

/// Metadata stored alongside each chunk vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub policy_id: String,
    pub policy_name: String,
    pub content_hash: String,
    pub chunk_index: usize,
    pub text: String,
    pub source_path: String,
}

/// The core VectorIndex trait.
///
/// Implementations: local cosine-similarity index (optionally persisted).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The backend name (e.g., "local").
    fn name(&self) -> &str;

    /// Insert or replace the chunk stored under `chunk_id`.
    async fn upsert(
        &self,
        chunk_id: &str,
        vector: Vec<f32>,
        payload: ChunkPayload,
    ) -> std::result::Result<(), IndexError>;

    /// The `k` chunks most similar to `vector`, best first.
    ///
    /// With `Some(ids)` and `ids` non-empty, only chunks whose policy id is in
    /// `ids` are considered; the filter applies before ranking, never after.
    async fn query(
        &self,
        vector: &[f32],
        policy_filter: Option<&[String]>,
        k: usize,
    ) -> std::result::Result<Vec<PolicyChunk>, IndexError>;

    /// Any chunk payload carrying this content hash.
    async fn exists_by_hash(&self, hash: &str) -> std::result::Result<Option<ChunkPayload>, IndexError>;

    /// Remove every chunk of a policy. Returns how many were removed.
    async fn delete_by_policy(&self, policy_id: &str) -> std::result::Result<usize, IndexError>;
}
