//! Context assembly: embed a request, retrieve matching policy chunks, and
//! render them into the text a prompt carries.
//!
//! The embedding and vector-search collaborators can both fail. Neither
//! failure aborts assembly: embedding falls back to an all-zero vector of
//! the configured width, retrieval to an empty chunk list, and the result
//! is marked [`Outcome::Degraded`].

use policydraft_config::AppConfig;
use policydraft_core::outcome::Outcome;
use policydraft_core::policy::PolicyChunk;
use policydraft_core::provider::{EmbeddingRequest, Provider};
use policydraft_core::vector::VectorIndex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rendered in place of policy text when retrieval finds nothing.
pub const NO_POLICY_SENTINEL: &str =
    "No relevant policy information found. Please note this in the response.";

/// Default number of chunks retrieved per request.
pub const DEFAULT_TOP_K: usize = 3;

pub struct ContextAssembler {
    provider: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
    embedding_model: String,
    dimensions: usize,
    top_k: usize,
}

impl ContextAssembler {
    pub fn new(
        provider: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        embedding_model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            provider,
            index,
            embedding_model: embedding_model.into(),
            dimensions,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            provider,
            index,
            config.ai.embedding_model.clone(),
            config.vector.dimensions,
        )
        .with_top_k(config.rag.results_count)
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    /// Embed one text. Degrades to a zero vector of the configured width.
    pub async fn embed(&self, text: &str) -> Outcome<Vec<f32>> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            inputs: vec![text.to_string()],
        };

        let reason = match self.provider.embed(request).await {
            Ok(response) => match response.embeddings.into_iter().next() {
                Some(vector) if !vector.is_empty() => return Outcome::success(vector),
                _ => "embedding response contained no vector".to_string(),
            },
            Err(e) => e.to_string(),
        };

        warn!(
            provider = self.provider.name(),
            error = %reason,
            dimensions = self.dimensions,
            "Embedding failed, using zero vector"
        );
        Outcome::degraded(vec![0.0; self.dimensions], reason)
    }

    /// The `k` nearest chunks, best first, restricted to `allowed_policy_ids`
    /// unless that list is empty. Degrades to no chunks.
    pub async fn retrieve(
        &self,
        vector: &[f32],
        allowed_policy_ids: &[String],
        k: usize,
    ) -> Outcome<Vec<PolicyChunk>> {
        match self.index.query(vector, Some(allowed_policy_ids), k).await {
            Ok(chunks) => {
                debug!(
                    index = self.index.name(),
                    allowed = allowed_policy_ids.len(),
                    found = chunks.len(),
                    "Retrieved policy chunks"
                );
                Outcome::success(chunks)
            }
            Err(e) => {
                warn!(index = self.index.name(), error = %e, "Retrieval failed, continuing without policy context");
                Outcome::degraded(Vec::new(), e.to_string())
            }
        }
    }

    /// `"From {policy}:\n{text}"` per chunk, separated by blank lines.
    pub fn render(chunks: &[PolicyChunk]) -> String {
        let rendered = chunks
            .iter()
            .map(|c| format!("From {}:\n{}", c.policy_name, c.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        if rendered.trim().is_empty() {
            NO_POLICY_SENTINEL.to_string()
        } else {
            rendered
        }
    }
}
