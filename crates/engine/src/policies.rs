//! Policy ingestion: copy an uploaded file, chunk it, embed the chunks and
//! index them for retrieval.

use chrono::Utc;
use policydraft_config::AppConfig;
use policydraft_core::error::{EntityKind, Error, ExtractionError, Result, StoreError};
use policydraft_core::extract::TextExtractor;
use policydraft_core::policy::Policy;
use policydraft_core::store::Store;
use policydraft_core::vector::ChunkPayload;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ContextAssembler;
use crate::pipeline::{Degradation, Stage};

/// The outcome of an upload.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyUpload {
    pub policy: Policy,
    /// Chunks extracted from the file.
    pub chunk_count: usize,
    /// True when identical content was already indexed; `policy` is then
    /// the existing record and nothing new was written.
    pub duplicate: bool,
    pub degradations: Vec<Degradation>,
}

pub struct PolicyService {
    policies: Arc<dyn Store<Policy>>,
    extractor: Arc<dyn TextExtractor>,
    assembler: Arc<ContextAssembler>,
    upload_dir: PathBuf,
}

/// Hex SHA-256 over the concatenated chunk texts.
pub fn content_hash(chunks: &[String]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

impl PolicyService {
    pub fn new(
        policies: Arc<dyn Store<Policy>>,
        extractor: Arc<dyn TextExtractor>,
        assembler: Arc<ContextAssembler>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            policies,
            extractor,
            assembler,
            upload_dir: upload_dir.into(),
        }
    }

    pub fn from_config(
        policies: Arc<dyn Store<Policy>>,
        extractor: Arc<dyn TextExtractor>,
        assembler: Arc<ContextAssembler>,
        config: &AppConfig,
    ) -> Self {
        Self::new(policies, extractor, assembler, config.upload_dir.clone())
    }

    /// Ingest the file at `source`.
    ///
    /// The file is copied to `{upload_dir}/{policy_id}_{file_name}`; that
    /// copy and any indexed chunks are removed again if ingestion fails.
    pub async fn upload(&self, source: &Path, description: &str) -> Result<PolicyUpload> {
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Validation(format!("{} has no file name", source.display())))?
            .to_string();

        let policy_id = Uuid::new_v4().to_string();
        let stored_path = self.upload_dir.join(format!("{policy_id}_{file_name}"));

        tokio::fs::create_dir_all(&self.upload_dir).await.map_err(|e| {
            StoreError::Storage(format!("Failed to create upload directory: {e}"))
        })?;
        tokio::fs::copy(source, &stored_path)
            .await
            .map_err(|e| ExtractionError::Read {
                path: source.display().to_string(),
                reason: e.to_string(),
            })?;

        debug!(policy_id = %policy_id, path = %stored_path.display(), "Policy file stored");

        match self.ingest(&policy_id, &file_name, description, &stored_path).await {
            Ok(upload) => {
                if upload.duplicate {
                    remove_file(&stored_path).await;
                }
                Ok(upload)
            }
            Err(e) => {
                warn!(policy_id = %policy_id, error = %e, "Policy upload failed, cleaning up");
                if let Err(cleanup) = self.assembler.index().delete_by_policy(&policy_id).await {
                    warn!(policy_id = %policy_id, error = %cleanup, "Failed to remove partial chunks");
                }
                remove_file(&stored_path).await;
                Err(e)
            }
        }
    }

    async fn ingest(
        &self,
        policy_id: &str,
        file_name: &str,
        description: &str,
        stored_path: &Path,
    ) -> Result<PolicyUpload> {
        let chunks = self.extractor.extract(stored_path).await?;
        if chunks.is_empty() {
            return Err(Error::Validation(format!(
                "no text could be extracted from {file_name}"
            )));
        }

        let hash = content_hash(&chunks);
        let index = self.assembler.index();

        if let Some(existing) = index.exists_by_hash(&hash).await? {
            if let Some(policy) = self.policies.get(&existing.policy_id).await? {
                info!(policy_id = %policy.id, hash = %hash, "Identical policy content already indexed");
                return Ok(PolicyUpload {
                    policy,
                    chunk_count: chunks.len(),
                    duplicate: true,
                    degradations: Vec::new(),
                });
            }
        }

        let source_path = stored_path.display().to_string();
        let mut degradations = Vec::new();
        for (i, text) in chunks.iter().enumerate() {
            let (vector, reason) = self.assembler.embed(text).await.into_parts();
            degradations.extend(reason.map(|r| Degradation::new(Stage::Embedding, r)));

            let payload = ChunkPayload {
                policy_id: policy_id.to_string(),
                policy_name: file_name.to_string(),
                content_hash: hash.clone(),
                chunk_index: i,
                text: text.clone(),
                source_path: source_path.clone(),
            };
            index.upsert(&format!("{policy_id}_{i}"), vector, payload).await?;
        }

        let policy = Policy {
            id: policy_id.to_string(),
            name: file_name.to_string(),
            description: description.to_string(),
            uploaded_at: Utc::now(),
            content_hash: hash,
            file_path: source_path,
        };
        self.policies.put(policy.clone()).await?;

        info!(
            policy_id,
            name = file_name,
            chunks = chunks.len(),
            degraded = degradations.len(),
            "Policy indexed"
        );
        Ok(PolicyUpload {
            policy,
            chunk_count: chunks.len(),
            duplicate: false,
            degradations,
        })
    }

    pub async fn list(&self) -> Result<Vec<Policy>> {
        Ok(self.policies.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Policy> {
        self.policies
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Policy, id))
    }

    /// Remove a policy's chunks, its stored file and its record.
    pub async fn delete(&self, id: &str) -> Result<Policy> {
        let policy = self.get(id).await?;

        let removed = self.assembler.index().delete_by_policy(id).await?;
        remove_file(Path::new(&policy.file_path)).await;
        self.policies.delete(id).await?;

        info!(policy_id = id, chunks = removed, "Policy deleted");
        Ok(policy)
    }
}

async fn remove_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove policy file"),
    }
}
