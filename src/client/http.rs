use reqwest::multipart::{Form, Part};
use reqwest::Response;
use tracing::{debug, info, warn};

use crate::client::session::{SelectedFile, SessionConfig, StudySession};
use crate::error::StudyError;
use crate::server::models::{ErrorResponse, GenerateRequest, GenerateResponse, UploadResponse};

/// HTTP transport for the study service.
#[derive(Debug, Clone)]
pub struct StudyClient {
    http: reqwest::Client,
    base_url: String,
}

impl StudyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.api_base.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /upload`. Returns the extracted text.
    pub async fn upload(&self, file: &SelectedFile) -> Result<String, StudyError> {
        let mut part = Part::bytes(file.data.clone()).file_name(file.file_name.clone());
        if let Some(ref content_type) = file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| StudyError::InvalidRequest(e.to_string()))?;
        }
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let body: UploadResponse = decode(resp, "Upload failed").await?;
        debug!(
            "Uploaded '{}': {} chars",
            file.file_name,
            body.text.chars().count()
        );
        Ok(body.text)
    }

    /// `POST /generate`.
    pub async fn generate(&self, text: &str) -> Result<GenerateResponse, StudyError> {
        let resp = self
            .http
            .post(format!("{}/generate", self.base_url))
            .json(&GenerateRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        decode(resp, "Generation failed").await
    }

    /// Drive one upload → generate round for the session's selected file.
    ///
    /// The generate request is only sent after the upload succeeds. Does
    /// nothing when the session's generate trigger is disabled. Returns
    /// whether the session ended in `Ready`.
    pub async fn run(&self, session: &mut StudySession) -> bool {
        let Some(file) = session.begin_generation() else {
            return false;
        };
        info!("Generating study material for '{}'", file.file_name);

        let result = async {
            let text = self.upload(&file).await?;
            self.generate(&text).await
        }
        .await;

        match result {
            Ok(resp) => {
                session.generation_succeeded(resp.result, resp.truncated);
                true
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                session.generation_failed(e.user_message());
                false
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> StudyError {
    StudyError::Upstream {
        message: format!("Could not reach the study service: {e}"),
    }
}

/// Decode a success body, or turn the service's `{ "error": … }` body into
/// an error carrying that message (`fallback` when the body has none).
async fn decode<T: serde::de::DeserializeOwned>(
    resp: Response,
    fallback: &str,
) -> Result<T, StudyError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp
            .json::<ErrorResponse>()
            .await
            .map(|b| b.error)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        return Err(StudyError::Upstream { message });
    }
    resp.json::<T>()
        .await
        .map_err(|e| StudyError::InvalidGeneratorOutput {
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = StudyClient::new("http://localhost:5000/");
        assert_eq!(c.base_url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn run_without_file_is_noop() {
        let client = StudyClient::from_config(&SessionConfig::default());
        let mut session = StudySession::new(SessionConfig::default());
        assert!(!client.run(&mut session).await);
        assert!(session.view().is_none());
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn unreachable_service_fails_session() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = StudyClient::new(format!("http://{addr}"));
        let mut session = StudySession::new(SessionConfig::default());
        session.select_file(SelectedFile::new("a.txt", Some("text/plain"), b"hi".to_vec()));
        assert!(!client.run(&mut session).await);
        let msg = session.error().unwrap();
        assert!(msg.starts_with("Could not reach the study service"), "{msg}");
    }
}
