//! Text extraction: staged document → one normalised string.
//!
//! Extractors declare which [`ContentType`]s they handle and the
//! [`ExtractorRegistry`] dispatches to the first one that accepts. Adding a
//! new format means adding an extractor, not touching the upload handler.
//!
//! ## Why spawn_blocking?
//!
//! pdfium is a blocking C++ library with thread-local state. Extraction runs
//! on the blocking pool so Tokio worker threads never stall on a large PDF.

use crate::error::StudyError;
use crate::pipeline::input::{ContentType, StagedDocument};
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a file on disk into raw text.
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this extractor can read documents of `content_type`.
    fn accepts(&self, content_type: ContentType) -> bool;

    /// Read the file at `path`. Blocking.
    fn extract(&self, path: &Path, file_name: &str) -> Result<String, StudyError>;
}

// ── Plain text ───────────────────────────────────────────────────────────

/// Reads the file as UTF-8, replacing invalid sequences.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn accepts(&self, content_type: ContentType) -> bool {
        content_type == ContentType::PlainText
    }

    fn extract(&self, path: &Path, file_name: &str) -> Result<String, StudyError> {
        let bytes = std::fs::read(path).map_err(|e| StudyError::ExtractionFailed {
            file_name: file_name.to_string(),
            detail: e.to_string(),
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ── PDF ──────────────────────────────────────────────────────────────────

/// Extracts the text layer of every page through pdfium.
///
/// Scanned PDFs without a text layer yield empty text; no OCR is attempted.
#[derive(Debug, Default)]
pub struct PdfExtractor {
    /// Directory holding the pdfium shared library. None = system search path.
    lib_dir: Option<PathBuf>,
}

impl PdfExtractor {
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }

    fn bind(&self) -> Result<Pdfium, StudyError> {
        let bindings = match self.lib_dir {
            Some(ref dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| StudyError::PdfiumBindingFailed(format!("{:?}", e)))?;
        Ok(Pdfium::new(bindings))
    }
}

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn accepts(&self, content_type: ContentType) -> bool {
        content_type == ContentType::Pdf
    }

    fn extract(&self, path: &Path, file_name: &str) -> Result<String, StudyError> {
        let pdfium = self.bind()?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| StudyError::ExtractionFailed {
                file_name: file_name.to_string(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let mut parts = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| StudyError::ExtractionFailed {
                file_name: file_name.to_string(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?;
            parts.push(text.all());
        }

        Ok(parts.join("\n"))
    }
}

// ── Registry ─────────────────────────────────────────────────────────────

/// Capability-based dispatch over a set of extractors.
#[derive(Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    /// PDF (via pdfium at `pdfium_lib_dir`) and plain text.
    pub fn with_defaults(pdfium_lib_dir: Option<PathBuf>) -> Self {
        Self {
            extractors: vec![
                Arc::new(PdfExtractor::new(pdfium_lib_dir)),
                Arc::new(PlainTextExtractor),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn register(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// First extractor that accepts `content_type`.
    pub fn find(&self, content_type: ContentType) -> Option<Arc<dyn TextExtractor>> {
        self.extractors
            .iter()
            .find(|e| e.accepts(content_type))
            .cloned()
    }

    /// Extract and normalise the text of a staged document.
    ///
    /// Consumes the staged document; its temp file is removed when this
    /// returns, whatever the outcome.
    pub async fn extract(&self, staged: StagedDocument) -> Result<String, StudyError> {
        let extractor = self
            .find(staged.content_type)
            .ok_or_else(|| StudyError::UnsupportedContentType {
                content_type: staged.content_type.mime().to_string(),
            })?;

        debug!(
            "Extracting '{}' with {}",
            staged.file_name,
            extractor.name()
        );

        let raw = tokio::task::spawn_blocking(move || {
            let result = extractor.extract(staged.path(), &staged.file_name);
            (result, staged)
        })
        .await
        .map_err(|e| StudyError::Internal(format!("Extraction task panicked: {}", e)))?;

        let (result, staged) = raw;
        let text = normalize_whitespace(&result?);
        if text.is_empty() {
            return Err(StudyError::NoTextContent {
                file_name: staged.file_name.clone(),
            });
        }

        info!(
            "Extracted {} chars from '{}'",
            text.chars().count(),
            staged.file_name
        );
        Ok(text)
    }
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every whitespace run to one space and trim both ends.
pub fn normalize_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::{stage, UploadedDocument};

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(
            normalize_whitespace("  The  cell\n\n is\tthe unit \r\n of life.  "),
            "The cell is the unit of life."
        );
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn registry_dispatches_by_capability() {
        let reg = ExtractorRegistry::with_defaults(None);
        assert_eq!(reg.find(ContentType::Pdf).unwrap().name(), "pdfium");
        assert_eq!(reg.find(ContentType::PlainText).unwrap().name(), "plain-text");
        assert!(ExtractorRegistry::empty().find(ContentType::Pdf).is_none());
    }

    #[tokio::test]
    async fn plain_text_extracts_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new(
            "notes.txt",
            Some("text/plain"),
            b"Mitochondria\n\nare the   powerhouse".to_vec(),
        )
        .unwrap();
        let staged = stage(&doc, Some(dir.path())).unwrap();

        let text = ExtractorRegistry::with_defaults(None)
            .extract(staged)
            .await
            .unwrap();

        assert_eq!(text, "Mitochondria are the powerhouse");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn blank_text_is_rejected_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new("blank.txt", None, b"  \n\n ".to_vec()).unwrap();
        let staged = stage(&doc, Some(dir.path())).unwrap();

        let err = ExtractorRegistry::with_defaults(None)
            .extract(staged)
            .await
            .unwrap_err();

        assert!(matches!(err, StudyError::NoTextContent { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_extractor_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new("a.txt", None, b"text".to_vec()).unwrap();
        let staged = stage(&doc, Some(dir.path())).unwrap();

        let err = ExtractorRegistry::empty().extract(staged).await.unwrap_err();

        assert!(matches!(err, StudyError::UnsupportedContentType { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
