//! Typed stages of document creation.
//!
//! Each stage consumes the previous one, so the only way to reach a
//! [`Draft`] is fill → embed → retrieve → render → prompt → generate:
//!
//! ```text
//! FilledRequest ─embed─▶ EmbeddedRequest ─retrieve─▶ RetrievedContext
//!       ─render─▶ RenderedContext ─prompt─▶ PromptedRequest ─generate─▶ Draft
//! ```
//!
//! Degradations picked up along the way travel with the stages and end up
//! on the draft.

use policydraft_core::document::{ContextPayload, GeneratedDocument};
use policydraft_core::fields;
use policydraft_core::policy::PolicyChunk;
use policydraft_core::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::context::ContextAssembler;
use crate::generation::Generator;
use crate::prompt::{GENERATION_SYSTEM_MESSAGE, build_generation_prompt};

/// A stage whose collaborator can fail without aborting the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Embedding,
    Retrieval,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Embedding => "embedding",
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
        })
    }
}

/// A collaborator failure that was replaced by a fallback value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub stage: Stage,
    pub reason: String,
}

impl Degradation {
    pub fn new(stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// The template with user values substituted.
#[derive(Debug)]
pub struct FilledRequest {
    template_id: String,
    policy_ids: Vec<String>,
    text: String,
}

impl FilledRequest {
    pub fn new(template: &Template, inputs: &HashMap<String, String>) -> Self {
        Self {
            template_id: template.id.clone(),
            policy_ids: template.policy_ids.clone(),
            text: fields::fill(template.content(), inputs),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn embed(self, assembler: &ContextAssembler) -> EmbeddedRequest {
        let (vector, reason) = assembler.embed(&self.text).await.into_parts();
        let degradations = reason
            .map(|r| Degradation::new(Stage::Embedding, r))
            .into_iter()
            .collect();
        EmbeddedRequest {
            request: self,
            vector,
            degradations,
        }
    }
}

#[derive(Debug)]
pub struct EmbeddedRequest {
    request: FilledRequest,
    vector: Vec<f32>,
    degradations: Vec<Degradation>,
}

impl EmbeddedRequest {
    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub async fn retrieve(self, assembler: &ContextAssembler) -> RetrievedContext {
        let Self {
            request,
            vector,
            mut degradations,
        } = self;

        let (chunks, reason) = assembler
            .retrieve(&vector, &request.policy_ids, assembler.top_k())
            .await
            .into_parts();
        degradations.extend(reason.map(|r| Degradation::new(Stage::Retrieval, r)));

        RetrievedContext {
            request,
            chunks,
            degradations,
        }
    }
}

#[derive(Debug)]
pub struct RetrievedContext {
    request: FilledRequest,
    chunks: Vec<PolicyChunk>,
    degradations: Vec<Degradation>,
}

impl RetrievedContext {
    pub fn chunks(&self) -> &[PolicyChunk] {
        &self.chunks
    }

    pub fn render(self) -> RenderedContext {
        let rendered = ContextAssembler::render(&self.chunks);
        RenderedContext {
            template_id: self.request.template_id,
            context: ContextPayload {
                filled_request: self.request.text,
                rendered_policy_text: rendered,
            },
            degradations: self.degradations,
        }
    }
}

/// The context snapshot that the document will carry for its lifetime.
#[derive(Debug)]
pub struct RenderedContext {
    template_id: String,
    context: ContextPayload,
    degradations: Vec<Degradation>,
}

impl RenderedContext {
    pub fn context(&self) -> &ContextPayload {
        &self.context
    }

    pub fn prompt(self) -> PromptedRequest {
        let prompt = build_generation_prompt(
            &self.context.filled_request,
            &self.context.rendered_policy_text,
        );
        PromptedRequest {
            rendered: self,
            prompt,
        }
    }
}

#[derive(Debug)]
pub struct PromptedRequest {
    rendered: RenderedContext,
    prompt: String,
}

impl PromptedRequest {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn generate(self, generator: &Generator) -> Draft {
        let RenderedContext {
            template_id,
            context,
            mut degradations,
        } = self.rendered;

        let (content, reason) = generator
            .generate(GENERATION_SYSTEM_MESSAGE, &self.prompt)
            .await
            .into_parts();
        degradations.extend(reason.map(|r| Degradation::new(Stage::Generation, r)));

        Draft {
            template_id,
            content,
            context,
            degradations,
        }
    }
}

/// Generated content ready to be persisted.
#[derive(Debug)]
pub struct Draft {
    template_id: String,
    content: String,
    context: ContextPayload,
    degradations: Vec<Degradation>,
}

impl Draft {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_document(self) -> (GeneratedDocument, Vec<Degradation>) {
        let document = GeneratedDocument::new(self.template_id, self.content, self.context);
        (document, self.degradations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NO_POLICY_SENTINEL;
    use crate::prompt::FALLBACK_CONTENT;
    use crate::test_helpers::ScriptedProvider;
    use policydraft_core::template::TemplateDraft;
    use policydraft_store::LocalVectorIndex;
    use std::sync::Arc;

    fn memo_template() -> Template {
        Template::new(TemplateDraft {
            name: "Memo".into(),
            content: "Draft a memo about ############# title: Topic description: subject of memo #############".into(),
            ..Default::default()
        })
    }

    fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn stages_run_in_order_to_a_draft() {
        let provider = Arc::new(ScriptedProvider::with_replies(["MEMO: remote work"]));
        let assembler = ContextAssembler::new(provider.clone(), Arc::new(LocalVectorIndex::new(3)), "m", 3);
        let generator = Generator::new(provider.clone(), "g");

        let filled = FilledRequest::new(&memo_template(), &inputs(&[("field-1", "remote work")]));
        assert_eq!(filled.text(), "Draft a memo about remote work");

        let embedded = filled.embed(&assembler).await;
        assert_eq!(embedded.vector(), &[1.0f32, 0.0, 0.0][..]);

        let retrieved = embedded.retrieve(&assembler).await;
        assert!(retrieved.chunks().is_empty());

        let rendered = retrieved.render();
        assert_eq!(rendered.context().rendered_policy_text, NO_POLICY_SENTINEL);

        let prompted = rendered.prompt();
        assert!(prompted.prompt().contains("Draft a memo about remote work"));
        assert!(prompted.prompt().contains(NO_POLICY_SENTINEL));

        let draft = prompted.generate(&generator).await;
        assert_eq!(draft.content(), "MEMO: remote work");

        let (document, degradations) = draft.into_document();
        assert!(degradations.is_empty());
        assert_eq!(document.context().filled_request, "Draft a memo about remote work");
    }

    #[tokio::test]
    async fn degradations_accumulate_across_stages() {
        let provider = Arc::new(ScriptedProvider::failing());
        let assembler = ContextAssembler::new(provider.clone(), Arc::new(LocalVectorIndex::new(3)), "m", 3);
        let generator = Generator::new(provider, "g");

        let draft = FilledRequest::new(&memo_template(), &HashMap::new())
            .embed(&assembler)
            .await
            .retrieve(&assembler)
            .await
            .render()
            .prompt()
            .generate(&generator)
            .await;

        assert_eq!(draft.content(), FALLBACK_CONTENT);
        let (_, degradations) = draft.into_document();
        let stages: Vec<Stage> = degradations.iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![Stage::Embedding, Stage::Generation]);
    }
}
