//! Local vector index — cosine-similarity search over policy chunks.
//!
//! Chunks are held in memory and, when opened with a path, mirrored to a
//! JSONL file the same way [`crate::FileStore`] persists records.

use async_trait::async_trait;
use policydraft_core::error::IndexError;
use policydraft_core::policy::PolicyChunk;
use policydraft_core::vector::{ChunkPayload, VectorIndex};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if the lengths differ or either vector is empty or all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    id: String,
    vector: Vec<f32>,
    payload: ChunkPayload,
}

/// An in-process vector index with optional JSONL persistence.
pub struct LocalVectorIndex {
    dimensions: usize,
    path: Option<PathBuf>,
    chunks: Arc<RwLock<Vec<IndexedChunk>>>,
}

impl LocalVectorIndex {
    /// An index that lives only as long as the process.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            path: None,
            chunks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// An index persisted at `path`, loading any chunks already there.
    pub fn open(path: PathBuf, dimensions: usize) -> Self {
        let chunks = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = chunks.len(), "Vector index loaded");
        Self {
            dimensions,
            path: Some(path),
            chunks: Arc::new(RwLock::new(chunks)),
        }
    }

    /// Open the `{collection}.vectors.jsonl` index inside `data_dir`.
    pub fn in_dir(data_dir: &Path, collection: &str, dimensions: usize) -> Self {
        Self::open(data_dir.join(format!("{collection}.vectors.jsonl")), dimensions)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    fn load_from_disk(path: &Path) -> Vec<IndexedChunk> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<IndexedChunk>(line) {
                Ok(chunk) => Some(chunk),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted vector entry");
                    None
                }
            })
            .collect()
    }

    fn flush(&self, chunks: &[IndexedChunk]) -> Result<(), IndexError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IndexError::Storage(format!("Failed to create index directory: {e}")))?;
        }

        let mut content = String::new();
        for chunk in chunks {
            let line = serde_json::to_string(chunk)
                .map_err(|e| IndexError::Storage(format!("Failed to serialize chunk: {e}")))?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(path, &content)
            .map_err(|e| IndexError::Storage(format!("Failed to write index file: {e}")))
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    fn name(&self) -> &str {
        "local"
    }

    async fn upsert(
        &self,
        chunk_id: &str,
        vector: Vec<f32>,
        payload: ChunkPayload,
    ) -> Result<(), IndexError> {
        self.check_dimensions(&vector)?;

        let mut chunks = self.chunks.write().await;
        let entry = IndexedChunk {
            id: chunk_id.to_string(),
            vector,
            payload,
        };
        let mut next = chunks.clone();
        match next.iter_mut().find(|c| c.id == chunk_id) {
            Some(slot) => *slot = entry,
            None => next.push(entry),
        }
        self.flush(&next)?;
        *chunks = next;
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        policy_filter: Option<&[String]>,
        k: usize,
    ) -> Result<Vec<PolicyChunk>, IndexError> {
        self.check_dimensions(vector)?;

        let allowed = policy_filter.filter(|ids| !ids.is_empty());
        let chunks = self.chunks.read().await;

        let mut scored: Vec<PolicyChunk> = chunks
            .iter()
            .filter(|c| allowed.is_none_or(|ids| ids.contains(&c.payload.policy_id)))
            .map(|c| PolicyChunk {
                text: c.payload.text.clone(),
                policy_name: c.payload.policy_name.clone(),
                policy_id: c.payload.policy_id.clone(),
                score: cosine_similarity(&c.vector, vector),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        debug!(candidates = chunks.len(), returned = scored.len(), k, "Vector query");
        Ok(scored)
    }

    async fn exists_by_hash(&self, hash: &str) -> Result<Option<ChunkPayload>, IndexError> {
        let chunks = self.chunks.read().await;
        Ok(chunks
            .iter()
            .find(|c| c.payload.content_hash == hash)
            .map(|c| c.payload.clone()))
    }

    async fn delete_by_policy(&self, policy_id: &str) -> Result<usize, IndexError> {
        let mut chunks = self.chunks.write().await;
        let next: Vec<IndexedChunk> = chunks
            .iter()
            .filter(|c| c.payload.policy_id != policy_id)
            .cloned()
            .collect();
        let removed = chunks.len() - next.len();
        if removed > 0 {
            self.flush(&next)?;
            *chunks = next;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload(policy_id: &str, index: usize, text: &str) -> ChunkPayload {
        ChunkPayload {
            policy_id: policy_id.into(),
            policy_name: format!("{policy_id}.txt"),
            content_hash: format!("hash-{policy_id}"),
            chunk_index: index,
            text: text.into(),
            source_path: format!("/uploads/{policy_id}.txt"),
        }
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn cosine_known_value() {
        // [1,1] · [1,0] = 1, |[1,1]| = sqrt(2), |[1,0]| = 1
        let sim = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((sim - 0.7071).abs() < 0.001);
    }

    #[tokio::test]
    async fn query_ranks_by_similarity() {
        let index = LocalVectorIndex::new(3);
        index.upsert("a_0", vec![0.0, 1.0, 0.0], payload("a", 0, "orthogonal")).await.unwrap();
        index.upsert("b_0", vec![1.0, 0.0, 0.0], payload("b", 0, "identical")).await.unwrap();
        index.upsert("c_0", vec![0.5, 0.5, 0.0], payload("c", 0, "partial")).await.unwrap();

        let results = index.query(&[1.0, 0.0, 0.0], None, 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "identical");
        assert_eq!(results[1].text, "partial");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn filter_applies_before_ranking() {
        let index = LocalVectorIndex::new(2);
        index.upsert("p2_0", vec![1.0, 0.0], payload("p2", 0, "best match")).await.unwrap();
        index.upsert("p1_0", vec![0.0, 1.0], payload("p1", 0, "weak match")).await.unwrap();

        let allowed = vec!["p1".to_string()];
        let results = index.query(&[1.0, 0.0], Some(&allowed), 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].policy_id, "p1");
    }

    #[tokio::test]
    async fn empty_filter_is_unrestricted() {
        let index = LocalVectorIndex::new(2);
        index.upsert("p1_0", vec![0.0, 1.0], payload("p1", 0, "one")).await.unwrap();
        index.upsert("p2_0", vec![1.0, 0.0], payload("p2", 0, "two")).await.unwrap();

        let results = index.query(&[1.0, 0.0], Some(&[]), 5).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let index = LocalVectorIndex::new(3);
        let err = index.upsert("x", vec![1.0], payload("x", 0, "t")).await.unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { expected: 3, actual: 1 }));
        assert!(index.query(&[1.0, 0.0], None, 1).await.is_err());
    }

    #[tokio::test]
    async fn hash_lookup_and_policy_delete() {
        let index = LocalVectorIndex::new(2);
        index.upsert("p1_0", vec![1.0, 0.0], payload("p1", 0, "a")).await.unwrap();
        index.upsert("p1_1", vec![0.0, 1.0], payload("p1", 1, "b")).await.unwrap();
        index.upsert("p2_0", vec![1.0, 1.0], payload("p2", 0, "c")).await.unwrap();

        let hit = index.exists_by_hash("hash-p1").await.unwrap().unwrap();
        assert_eq!(hit.policy_id, "p1");
        assert!(index.exists_by_hash("hash-none").await.unwrap().is_none());

        assert_eq!(index.delete_by_policy("p1").await.unwrap(), 2);
        assert_eq!(index.len().await, 1);
        assert!(index.exists_by_hash("hash-p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persisted_index_reloads() {
        let dir = TempDir::new().unwrap();
        {
            let index = LocalVectorIndex::in_dir(dir.path(), "policies", 2);
            index.upsert("p1_0", vec![1.0, 0.0], payload("p1", 0, "kept")).await.unwrap();
        }

        let reopened = LocalVectorIndex::in_dir(dir.path(), "policies", 2);
        assert_eq!(reopened.len().await, 1);
        let results = reopened.query(&[1.0, 0.0], None, 3).await.unwrap();
        assert_eq!(results[0].text, "kept");
    }

    #[tokio::test]
    async fn failed_writes_leave_index_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("policies.vectors.jsonl");
        let index = LocalVectorIndex::open(path.clone(), 2);
        index.upsert("p1_0", vec![1.0, 0.0], payload("p1", 0, "kept")).await.unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = index.upsert("p2_0", vec![0.0, 1.0], payload("p2", 0, "lost")).await.unwrap_err();
        assert!(matches!(err, IndexError::Storage(_)));
        assert!(index.delete_by_policy("p1").await.is_err());

        assert_eq!(index.len().await, 1);
        let results = index.query(&[0.0, 1.0], None, 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "kept");
    }
}
