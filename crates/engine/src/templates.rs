//! Template management.

use policydraft_core::error::{EntityKind, Error, Result};
use policydraft_core::store::Store;
use policydraft_core::template::{Template, TemplateDraft};
use std::sync::Arc;
use tracing::info;

pub struct TemplateService {
    templates: Arc<dyn Store<Template>>,
}

impl TemplateService {
    pub fn new(templates: Arc<dyn Store<Template>>) -> Self {
        Self { templates }
    }

    fn validate(draft: &TemplateDraft) -> Result<()> {
        if draft.name.trim().is_empty() {
            return Err(Error::Validation("template name must not be empty".into()));
        }
        Ok(())
    }

    pub async fn create(&self, draft: TemplateDraft) -> Result<Template> {
        Self::validate(&draft)?;
        let template = Template::new(draft);
        self.templates.put(template.clone()).await?;
        info!(template_id = %template.id, fields = template.fields().len(), "Template created");
        Ok(template)
    }

    pub async fn get(&self, id: &str) -> Result<Template> {
        self.templates
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found(EntityKind::Template, id))
    }

    pub async fn list(&self) -> Result<Vec<Template>> {
        Ok(self.templates.list().await?)
    }

    /// Replace a template's editable parts. Fields are re-derived from the
    /// new content; id and `created_at` are kept.
    pub async fn update(&self, id: &str, draft: TemplateDraft) -> Result<Template> {
        Self::validate(&draft)?;
        let mut template = self.get(id).await?;
        template.revise(draft);
        self.templates.put(template.clone()).await?;
        info!(template_id = id, fields = template.fields().len(), "Template updated");
        Ok(template)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.templates.delete(id).await? {
            return Err(Error::not_found(EntityKind::Template, id));
        }
        info!(template_id = id, "Template deleted");
        Ok(())
    }
}
