//! Plain-text extraction and fixed-size chunking.
//!
//! Chunks are windows of at most `chunk_size` characters, each starting up
//! to `chunk_overlap` characters before the previous one ended. Windows
//! prefer to end just after whitespace in their second half, and overlaps
//! start at a word boundary, so words are not cut in two.

use async_trait::async_trait;
use policydraft_config::RagConfig;
use policydraft_core::error::ExtractionError;
use policydraft_core::extract::TextExtractor;
use std::path::Path;
use tracing::debug;

/// Reads UTF-8 text files and splits them into overlapping chunks.
pub struct PlainTextExtractor {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl PlainTextExtractor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn from_config(rag: &RagConfig) -> Self {
        Self::new(rag.chunk_size, rag.chunk_overlap)
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        split_text(text, self.chunk_size, self.chunk_overlap)
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain_text"
    }

    async fn extract(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ExtractionError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let text = String::from_utf8(bytes).map_err(|_| {
            ExtractionError::Unsupported(format!("{} is not UTF-8 text", path.display()))
        })?;

        let chunks = self.split(&text);
        debug!(path = %path.display(), chars = text.chars().count(), chunks = chunks.len(), "Extracted text");
        Ok(chunks)
    }
}

/// Split `text` into trimmed, non-empty windows of at most `size` characters
/// overlapping by `overlap` characters.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + size).min(chars.len());

        if end < chars.len() {
            let window = &chars[start..end];
            if let Some(pos) = window.iter().rposition(|c| c.is_whitespace()) {
                if pos >= size / 2 {
                    end = start + pos + 1;
                }
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end >= chars.len() {
            break;
        }
        let mut next = end.saturating_sub(overlap);
        // Start the overlap on a word boundary when one is in reach.
        if next > 0 && !chars[next - 1].is_whitespace() {
            if let Some(pos) = chars[next..end].iter().position(|c| c.is_whitespace()) {
                next += pos + 1;
            }
        }
        start = if next > start { next } else { end };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_text("  Leave is 20 days.  ", 1000, 200), vec!["Leave is 20 days."]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(split_text("", 100, 10).is_empty());
        assert!(split_text(" \n\t ", 100, 10).is_empty());
    }

    #[test]
    fn windows_respect_size_and_overlap() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let words: Vec<&str> = text.split_whitespace().collect();
        let chunks = split_text(text, 20, 12);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
        for chunk in &chunks {
            assert!(chunk.split_whitespace().all(|w| words.contains(&w)), "cut word in {chunk:?}");
        }
        // Consecutive chunks share a word because of the overlap.
        for pair in chunks.windows(2) {
            assert!(
                pair[1].split_whitespace().any(|w| pair[0].split_whitespace().any(|p| p == w)),
                "{:?} should overlap {:?}",
                pair[1],
                pair[0]
            );
        }
        for word in &words {
            assert!(chunks.iter().any(|c| c.contains(word)), "missing {word}");
        }
    }

    #[test]
    fn breaks_prefer_whitespace() {
        let chunks = split_text("aaaa bbbb cccc dddd", 12, 0);
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc dddd"]);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "ééééé ééééé ééééé";
        let chunks = split_text(text, 7, 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= 7));
        assert!(!chunks.is_empty());
    }

    #[test]
    fn unbroken_text_still_advances() {
        let chunks = split_text(&"x".repeat(25), 10, 9);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert!(chunks.last().unwrap().len() >= 1);
    }

    #[tokio::test]
    async fn extracts_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "Employees may work remotely two days a week.").unwrap();

        let extractor = PlainTextExtractor::new(1000, 200);
        let chunks = extractor.extract(tmp.path()).await.unwrap();
        assert_eq!(chunks, vec!["Employees may work remotely two days a week."]);
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let extractor = PlainTextExtractor::default();
        let err = extractor.extract(Path::new("/nonexistent/policy.txt")).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Read { .. }));
    }

    #[tokio::test]
    async fn binary_file_is_unsupported() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&[0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = PlainTextExtractor::default().extract(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported(_)));
    }
}
