//! Input resolution: classify an upload and stage its bytes on disk.
//!
//! pdfium opens documents by path, so every upload is written to a
//! [`NamedTempFile`] before extraction. The file is deleted when the
//! [`StagedDocument`] drops, on the success path and on every error path
//! alike. We check the PDF magic bytes (`%PDF`) before staging so an
//! obviously wrong file is rejected without touching the disk.

use crate::error::StudyError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// The content types the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    PlainText,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Pdf => "application/pdf",
            ContentType::PlainText => "text/plain",
        }
    }

    /// Resolve a declared MIME type, falling back to the file extension when
    /// the declaration is missing or generic.
    ///
    /// Parameters such as `; charset=utf-8` are ignored.
    pub fn resolve(declared: Option<&str>, file_name: &str) -> Result<Self, StudyError> {
        let essence = declared
            .map(|d| d.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty());

        match essence.as_deref() {
            Some("application/pdf") => Ok(ContentType::Pdf),
            Some("text/plain") => Ok(ContentType::PlainText),
            None | Some("application/octet-stream") => Self::from_extension(file_name)
                .ok_or_else(|| StudyError::UnsupportedContentType {
                    content_type: essence.clone().unwrap_or_else(|| file_name.to_string()),
                }),
            Some(other) => Err(StudyError::UnsupportedContentType {
                content_type: other.to_string(),
            }),
        }
    }

    fn from_extension(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(ContentType::Pdf)
        } else if lower.ends_with(".txt") {
            Some(ContentType::PlainText)
        } else {
            None
        }
    }
}

/// An uploaded file with its data and resolved type.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: ContentType,
    pub data: Vec<u8>,
}

impl UploadedDocument {
    /// Classify raw upload parts into a document, validating PDF magic bytes.
    pub fn new(
        file_name: impl Into<String>,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<Self, StudyError> {
        let file_name = file_name.into();
        let content_type = ContentType::resolve(declared_type, &file_name)?;
        if content_type == ContentType::Pdf && !data.starts_with(b"%PDF") {
            return Err(StudyError::NotAPdf { file_name });
        }
        Ok(Self {
            file_name,
            content_type,
            data,
        })
    }
}

/// A document written to a temporary file for the duration of extraction.
///
/// Dropping it deletes the file.
pub struct StagedDocument {
    pub file_name: String,
    pub content_type: ContentType,
    file: NamedTempFile,
}

impl StagedDocument {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write the upload to a self-deleting temp file in `dir` (or the system temp dir).
pub fn stage(doc: &UploadedDocument, dir: Option<&Path>) -> Result<StagedDocument, StudyError> {
    let builder_result = match dir {
        Some(d) => tempfile::Builder::new().prefix("upload-").tempfile_in(d),
        None => tempfile::Builder::new().prefix("upload-").tempfile(),
    };
    let mut file = builder_result.map_err(|e| StudyError::Internal(format!("tempfile: {e}")))?;
    file.write_all(&doc.data)
        .map_err(|e| StudyError::Internal(format!("tempfile write: {e}")))?;
    file.flush()
        .map_err(|e| StudyError::Internal(format!("tempfile flush: {e}")))?;

    debug!(
        "Staged '{}' ({} bytes) at {}",
        doc.file_name,
        doc.data.len(),
        file.path().display()
    );

    Ok(StagedDocument {
        file_name: doc.file_name.clone(),
        content_type: doc.content_type,
        file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_resolve() {
        assert_eq!(
            ContentType::resolve(Some("application/pdf"), "x").unwrap(),
            ContentType::Pdf
        );
        assert_eq!(
            ContentType::resolve(Some("text/plain; charset=utf-8"), "x").unwrap(),
            ContentType::PlainText
        );
    }

    #[test]
    fn generic_type_falls_back_to_extension() {
        assert_eq!(
            ContentType::resolve(Some("application/octet-stream"), "notes.TXT").unwrap(),
            ContentType::PlainText
        );
        assert_eq!(
            ContentType::resolve(None, "paper.pdf").unwrap(),
            ContentType::Pdf
        );
    }

    #[test]
    fn other_types_are_rejected() {
        let err = ContentType::resolve(Some("image/png"), "cat.png").unwrap_err();
        assert!(matches!(err, StudyError::UnsupportedContentType { .. }));
        assert!(ContentType::resolve(None, "slides.pptx").is_err());
    }

    #[test]
    fn pdf_without_magic_is_rejected() {
        let err = UploadedDocument::new("fake.pdf", Some("application/pdf"), b"hello".to_vec())
            .unwrap_err();
        assert!(matches!(err, StudyError::NotAPdf { .. }));
    }

    #[test]
    fn staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let doc = UploadedDocument::new("n.txt", Some("text/plain"), b"abc".to_vec()).unwrap();
        let staged = stage(&doc, Some(dir.path())).unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
        drop(staged);
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
