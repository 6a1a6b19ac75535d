//! Error types for the studydeck library.
//!
//! Every failure in the upload → extract → generate pipeline is a
//! [`StudyError`]. Each variant belongs to one of three coarse kinds
//! ([`ErrorKind`]) which decide how the error is shown to the user and which
//! HTTP status the service answers with:
//!
//! * **Validation**: bad or missing input the user can fix. The message is
//!   shown verbatim. HTTP 400.
//! * **Upstream**: the PDF engine or the language-model service failed.
//!   The upstream message is passed through when there is one. HTTP 500.
//! * **Format**: the model answered, but not with the JSON we asked for.
//!   Shown as a fixed "try again" message. HTTP 500.
//!
//! No error is retried: each one ends the current request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Fixed message shown for any [`ErrorKind::Format`] error.
pub const INVALID_OUTPUT_MESSAGE: &str = "The AI returned an invalid response. Please try again.";

/// Coarse error taxonomy used for user-facing messages and HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    Format,
}

/// All errors returned by the studydeck library.
#[derive(Debug, Error)]
pub enum StudyError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// No `file` field was present in the upload.
    #[error("No file uploaded")]
    MissingFile,

    /// The uploaded file is neither a PDF nor plain text.
    #[error("Only PDF and plain-text files are allowed (got '{content_type}')")]
    UnsupportedContentType { content_type: String },

    /// The file claims to be a PDF but does not start with `%PDF`.
    #[error("File '{file_name}' is not a valid PDF")]
    NotAPdf { file_name: String },

    /// Extraction succeeded but produced nothing once whitespace was collapsed.
    #[error("No extractable text found in '{file_name}'")]
    NoTextContent { file_name: String },

    /// `/generate` was called with empty text.
    #[error("No text provided")]
    EmptyText,

    /// The request body could not be read (malformed multipart or JSON).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The extraction engine failed on an accepted document.
    #[error("Failed to extract text from '{file_name}': {detail}")]
    ExtractionFailed { file_name: String, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium."
    )]
    PdfiumBindingFailed(String),

    /// The configured LLM provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM service returned an error or could not be reached.
    ///
    /// `message` carries the upstream text verbatim when one was available.
    #[error("{message}")]
    Upstream { message: String },

    // ── Format errors ─────────────────────────────────────────────────────
    /// The model reply was not a JSON object of the expected shape.
    #[error("Invalid generator output: {detail}")]
    InvalidGeneratorOutput { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudyError {
    /// Classify the error for display and status-code purposes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StudyError::MissingFile
            | StudyError::UnsupportedContentType { .. }
            | StudyError::NotAPdf { .. }
            | StudyError::NoTextContent { .. }
            | StudyError::EmptyText
            | StudyError::InvalidRequest(_) => ErrorKind::Validation,
            StudyError::InvalidGeneratorOutput { .. } => ErrorKind::Format,
            StudyError::ExtractionFailed { .. }
            | StudyError::PdfiumBindingFailed(_)
            | StudyError::ProviderNotConfigured { .. }
            | StudyError::Upstream { .. }
            | StudyError::InvalidConfig(_)
            | StudyError::Internal(_) => ErrorKind::Upstream,
        }
    }

    /// HTTP status the service answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Upstream | ErrorKind::Format => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the end user.
    pub fn user_message(&self) -> String {
        match self {
            StudyError::InvalidGeneratorOutput { .. } => INVALID_OUTPUT_MESSAGE.to_string(),
            StudyError::Upstream { message } if message.trim().is_empty() => {
                "Failed to generate study material".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for StudyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.user_message() });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(StudyError::EmptyText.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(StudyError::MissingFile.status_code(), StatusCode::BAD_REQUEST);
        let e = StudyError::UnsupportedContentType {
            content_type: "image/png".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Validation);
        assert!(e.to_string().contains("image/png"));
    }

    #[test]
    fn format_error_uses_fixed_message() {
        let e = StudyError::InvalidGeneratorOutput {
            detail: "expected value at line 1 column 1".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Format);
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.user_message(), INVALID_OUTPUT_MESSAGE);
    }

    #[test]
    fn upstream_message_is_verbatim() {
        let e = StudyError::Upstream {
            message: "Incorrect API key provided".into(),
        };
        assert_eq!(e.user_message(), "Incorrect API key provided");
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_upstream_message_falls_back_to_generic() {
        let e = StudyError::Upstream {
            message: "  ".into(),
        };
        assert_eq!(e.user_message(), "Failed to generate study material");
    }
}
