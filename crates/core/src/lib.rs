//! # PolicyDraft Core
//!
//! Domain types, collaborator traits, and error definitions for PolicyDraft.
//! It carries no I/O, HTTP or runtime dependencies (only `serde`, `uuid`,
//! `chrono`, `thiserror` and `async-trait`) and defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (generation, embedding, vector search,
//! persistence, text extraction) is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)
//!
//! The template field engine lives here too, since a [`Template`]'s field
//! list is derived from its content on every write.

pub mod error;
pub mod message;
pub mod provider;
pub mod outcome;
pub mod fields;
pub mod template;
pub mod policy;
pub mod document;
pub mod store;
pub mod vector;
pub mod extract;

// Re-export key types at crate root for ergonomics
pub use error::{EntityKind, Error, Result};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use outcome::Outcome;
pub use fields::FieldDescriptor;
pub use template::{Template, TemplateDraft};
pub use policy::{Policy, PolicyChunk};
pub use document::{ContextPayload, DocumentState, GeneratedDocument};
pub use store::{Record, Store};
pub use vector::{ChunkPayload, VectorIndex};
pub use extract::TextExtractor;
