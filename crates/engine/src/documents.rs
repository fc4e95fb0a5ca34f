//! The document lifecycle: `Uncreated → Generated → Refined(n)`.
//!
//! `create` and `refine` only abort on a missing template/document or a
//! store failure. Everything the AI collaborators get wrong is absorbed
//! into fallback values and listed in [`Transition::degradations`].

use policydraft_core::document::GeneratedDocument;
use policydraft_core::error::{EntityKind, Error, Result};
use policydraft_core::store::Store;
use policydraft_core::template::Template;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::context::ContextAssembler;
use crate::generation::Generator;
use crate::pipeline::{Degradation, FilledRequest, Stage};
use crate::prompt::{REFINEMENT_SYSTEM_MESSAGE, build_refinement_prompt};

/// The result of a completed create or refine.
#[derive(Debug, Clone, Serialize)]
pub struct Transition {
    pub document: GeneratedDocument,
    pub degradations: Vec<Degradation>,
}

impl Transition {
    /// Whether any collaborator fell back during this transition.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

pub struct DocumentService {
    templates: Arc<dyn Store<Template>>,
    documents: Arc<dyn Store<GeneratedDocument>>,
    assembler: Arc<ContextAssembler>,
    generator: Arc<Generator>,
}

impl DocumentService {
    pub fn new(
        templates: Arc<dyn Store<Template>>,
        documents: Arc<dyn Store<GeneratedDocument>>,
        assembler: Arc<ContextAssembler>,
        generator: Arc<Generator>,
    ) -> Self {
        Self {
            templates,
            documents,
            assembler,
            generator,
        }
    }

    /// Generate a new document from a template and the user's field values.
    pub async fn create(
        &self,
        template_id: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<Transition> {
        let template = self
            .templates
            .get(template_id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Template, template_id))?;

        info!(
            template_id,
            fields = template.fields().len(),
            inputs = inputs.len(),
            policies = template.policy_ids.len(),
            "Creating document"
        );

        let draft = FilledRequest::new(&template, inputs)
            .embed(&self.assembler)
            .await
            .retrieve(&self.assembler)
            .await
            .render()
            .prompt()
            .generate(&self.generator)
            .await;

        let (document, degradations) = draft.into_document();
        self.documents.put(document.clone()).await?;

        info!(
            document_id = %document.id,
            template_id,
            degraded = degradations.len(),
            "Document generated"
        );
        Ok(Transition {
            document,
            degradations,
        })
    }

    /// Regenerate a document's content from feedback, reusing the context
    /// captured when it was created.
    pub async fn refine(&self, document_id: &str, feedback: &str) -> Result<Transition> {
        let mut document = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Document, document_id))?;

        let context = document.context();
        let prompt = build_refinement_prompt(
            &document.content,
            feedback,
            &context.filled_request,
            &context.rendered_policy_text,
        );

        let (content, reason) = self
            .generator
            .generate(REFINEMENT_SYSTEM_MESSAGE, &prompt)
            .await
            .into_parts();
        let degradations: Vec<Degradation> = reason
            .map(|r| Degradation::new(Stage::Generation, r))
            .into_iter()
            .collect();

        document.refine(content);
        self.documents.put(document.clone()).await?;

        if degradations.is_empty() {
            info!(document_id, state = %document.state(), "Document refined");
        } else {
            warn!(document_id, state = %document.state(), "Document refined with fallback content");
        }
        Ok(Transition {
            document,
            degradations,
        })
    }

    pub async fn get(&self, document_id: &str) -> Result<GeneratedDocument> {
        self.documents
            .get(document_id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Document, document_id))
    }

    pub async fn list(&self) -> Result<Vec<GeneratedDocument>> {
        Ok(self.documents.list().await?)
    }
}
