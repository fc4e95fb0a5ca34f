//! Record stores and vector search implementations for PolicyDraft.

pub mod in_memory;
pub mod file_store;
pub mod vector;

pub use in_memory::InMemoryStore;
pub use file_store::FileStore;
pub use vector::{cosine_similarity, LocalVectorIndex};
