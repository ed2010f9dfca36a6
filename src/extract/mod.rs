//! Text extraction seam for uploaded files.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::RetrievalError;

/// Turns a stored upload into raw text.
///
/// Extraction for binary formats (PDF, Office documents) is an external
/// capability; implementations of this trait wrap whichever converters a
/// deployment ships with. [`PlainTextExtractor`] covers the text-like
/// formats the engine can read directly.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text content of the file at `path`.
    ///
    /// Fails with [`RetrievalError::Extraction`] on an unsupported
    /// format, an unreadable file, or a file with no extractable text.
    async fn extract_text(&self, path: &Path) -> Result<String, RetrievalError>;
}

const TEXT_EXTENSIONS: [&str; 7] = ["txt", "md", "markdown", "csv", "json", "html", "htm"];

/// Extractor for plain-text and markup uploads.
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String, RetrievalError> {
        if !Self::is_supported(path) {
            return Err(RetrievalError::Extraction(format!(
                "unsupported file format: {}",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RetrievalError::Extraction(format!("cannot read {}: {e}", path.display()))
        })?;

        let text = String::from_utf8(bytes).map_err(|_| {
            RetrievalError::Extraction(format!("{} is not valid UTF-8 text", path.display()))
        })?;

        if text.trim().is_empty() {
            return Err(RetrievalError::Extraction(format!(
                "{} contains no extractable text",
                path.display()
            )));
        }

        debug!(path = %path.display(), bytes = text.len(), "extracted text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[tokio::test]
    async fn extracts_plain_text() {
        let file = temp_file(".txt", b"Hello from an upload.");
        let extractor = PlainTextExtractor::new();
        let text = extractor.extract_text(file.path()).await.unwrap();
        assert_eq!(text, "Hello from an upload.");
    }

    #[tokio::test]
    async fn rejects_unsupported_format() {
        let file = temp_file(".pdf", b"%PDF-1.7");
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Extraction(_)));
    }

    #[tokio::test]
    async fn rejects_empty_file() {
        let file = temp_file(".md", b"  \n \n ");
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Extraction(_)));
    }

    #[tokio::test]
    async fn rejects_missing_file() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract_text(Path::new("/nonexistent/file.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Extraction(_)));
    }

    #[tokio::test]
    async fn rejects_non_utf8_content() {
        let file = temp_file(".txt", &[0xff, 0xfe, 0x00, 0x01]);
        let extractor = PlainTextExtractor::new();
        let err = extractor.extract_text(file.path()).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Extraction(_)));
    }
}
