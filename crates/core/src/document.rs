//! Generated documents and their refinement state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::store::Record;

/// The grounding snapshot taken when a document is created.
///
/// Every refinement reuses it unchanged; nothing is re-filled or
/// re-retrieved after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPayload {
    /// The template after field substitution.
    pub filled_request: String,
    /// Retrieved policy text, already rendered.
    pub rendered_policy_text: String,
}

/// Position of a document in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "refinements", rename_all = "snake_case")]
pub enum DocumentState {
    Generated,
    Refined(u32),
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => f.write_str("generated"),
            Self::Refined(n) => write!(f, "refined({n})"),
        }
    }
}

/// A persisted generated document.
///
/// `content` and `refined_at` change on refinement. The context payload,
/// template id and generation time are fixed at creation and only readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub id: String,
    template_id: String,
    pub content: String,
    generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    refinements: u32,
    context: ContextPayload,
}

impl GeneratedDocument {
    /// A freshly generated document (state `Generated`).
    pub fn new(template_id: impl Into<String>, content: impl Into<String>, context: ContextPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            template_id: template_id.into(),
            content: content.into(),
            generated_at: Utc::now(),
            refined_at: None,
            refinements: 0,
            context,
        }
    }

    /// Record one refinement: new content, new `refined_at`, next state.
    pub fn refine(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.refined_at = Some(Utc::now());
        self.refinements += 1;
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn context(&self) -> &ContextPayload {
        &self.context
    }

    pub fn state(&self) -> DocumentState {
        match self.refinements {
            0 => DocumentState::Generated,
            n => DocumentState::Refined(n),
        }
    }
}

impl Record for GeneratedDocument {
    const COLLECTION: &'static str = "documents";

    fn id(&self) -> &str {
        &self.id
    }
}
