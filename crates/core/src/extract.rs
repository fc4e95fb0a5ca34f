//! Text extraction trait — turns a policy source file into ordered chunks.

use async_trait::async_trait;
use std::path::Path;
use crate::error::ExtractionError;

/// The core TextExtractor trait.
///
/// Returns text chunks in document order, sized by the implementation's
/// configured chunk length and overlap. An empty result means nothing usable
/// was found; the caller decides whether that is an error.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &str;

    async fn extract(&self, path: &Path) -> std::result::Result<Vec<String>, ExtractionError>;
}
