//! LLM Provider implementations for PolicyDraft.
//!
//! All providers implement the `policydraft_core::Provider` trait and serve
//! as both the embedding and the text-generation collaborator.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
