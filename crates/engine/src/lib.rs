//! The PolicyDraft engine: turns a template plus user inputs into a
//! policy-grounded document, and refines it on feedback.
//!
//! Creation runs a fixed sequence of stages:
//!
//! 1. **Fill** the template's field blocks with the user's values
//! 2. **Embed** the filled request
//! 3. **Retrieve** the nearest policy chunks, restricted to the template's policies
//! 4. **Render** the chunks into a single policy-context string
//! 5. **Prompt** the generator with request and context
//! 6. **Generate** and persist the document with its context snapshot
//!
//! Failures of the embedding or generation service never abort a
//! transition; they are reported as [`Degradation`]s next to the result.

pub mod chunking;
pub mod context;
pub mod documents;
pub mod generation;
pub mod pipeline;
pub mod policies;
pub mod prompt;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chunking::PlainTextExtractor;
pub use context::ContextAssembler;
pub use documents::{DocumentService, Transition};
pub use generation::Generator;
pub use pipeline::{Degradation, Stage};
pub use policies::{PolicyService, PolicyUpload};
pub use templates::TemplateService;
