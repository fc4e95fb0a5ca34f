//! Policy records and the chunks retrieved from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

/// An uploaded policy source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    /// Original file name of the upload.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub uploaded_at: DateTime<Utc>,
    /// SHA-256 over the extracted chunk text, used for dedup.
    pub content_hash: String,
    /// Where the uploaded copy is kept.
    pub file_path: String,
}

impl Record for Policy {
    const COLLECTION: &'static str = "policies";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A policy chunk returned by similarity search. Ephemeral, produced per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyChunk {
    pub text: String,
    pub policy_name: String,
    pub policy_id: String,
    /// Similarity to the query vector (higher is closer).
    pub score: f32,
}
