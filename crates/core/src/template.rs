//! Template records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{self, FieldDescriptor};
use crate::store::Record;

/// The user-editable part of a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    /// Policies retrieval is restricted to. Empty = all policies.
    #[serde(default)]
    pub policy_ids: Vec<String>,
}

/// A stored template.
///
/// `fields` is always derived from `content`; the only ways to set content
/// are [`Template::new`] and [`Template::revise`], both of which re-parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    content: String,
    pub policy_ids: Vec<String>,
    fields: Vec<FieldDescriptor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a template with a fresh id.
    pub fn new(draft: TemplateDraft) -> Self {
        let now = Utc::now();
        let fields = fields::parse(&draft.content);
        Self {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            description: draft.description,
            content: draft.content,
            policy_ids: draft.policy_ids,
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace everything editable, keeping id and creation time.
    pub fn revise(&mut self, draft: TemplateDraft) {
        self.fields = fields::parse(&draft.content);
        self.name = draft.name;
        self.description = draft.description;
        self.content = draft.content;
        self.policy_ids = draft.policy_ids;
        self.updated_at = Utc::now();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

impl Record for Template {
    const COLLECTION: &'static str = "templates";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(content: &str) -> TemplateDraft {
        TemplateDraft {
            name: "Memo".into(),
            description: "Internal memo".into(),
            content: content.into(),
            policy_ids: vec![],
        }
    }

    #[test]
    fn new_template_derives_fields() {
        let template = Template::new(draft(
            "Memo on ############# title: Topic description: subject #############",
        ));
        assert_eq!(template.fields().len(), 1);
        assert_eq!(template.fields()[0].id, "field-1");
        assert_eq!(template.created_at, template.updated_at);
    }

    #[test]
    fn revise_recomputes_fields_and_keeps_identity() {
        let mut template = Template::new(draft("no fields"));
        let id = template.id.clone();
        let created = template.created_at;

        template.revise(draft(
            "############# title: A description: a ############# \
             ############# title: B description: b #############",
        ));

        assert_eq!(template.id, id);
        assert_eq!(template.created_at, created);
        assert!(template.updated_at >= created);
        assert_eq!(template.fields().len(), 2);
    }

    #[test]
    fn fields_survive_serialization() {
        let template = Template::new(draft("x ############# title: T description: D #############"));
        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fields(), template.fields());
        assert_eq!(back.content(), template.content());
    }
}
