//! Language-model interaction: send one prompt, get one reply.
//!
//! All prompt wording lives in [`crate::prompts`]; all reply parsing lives in
//! [`crate::pipeline::postprocess`]. This module only moves text to and from
//! a backend behind the [`TextGenerator`] trait:
//!
//! * [`ProviderGenerator`] wraps any `edgequake_llm` provider (OpenAI,
//!   Anthropic, Gemini, Ollama, …).
//! * [`HttpChatGenerator`] calls an OpenAI-compatible `/chat/completions`
//!   endpoint directly with an explicit base URL and API key.
//!
//! Each call is made exactly once. Failures surface as
//! [`StudyError::Upstream`] carrying the upstream message verbatim.

use crate::config::{GenerationConfig, DEFAULT_MODEL};
use crate::error::StudyError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A backend that answers a system + user prompt with text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send the prompts and return the raw reply text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, StudyError>;
}

// ── edgequake-llm provider ───────────────────────────────────────────────

/// Generator backed by an `edgequake_llm` provider.
pub struct ProviderGenerator {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl ProviderGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &GenerationConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl TextGenerator for ProviderGenerator {
    fn name(&self) -> &str {
        "edgequake-llm"
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, StudyError> {
        let start = Instant::now();
        let messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];

        match self.provider.chat(&messages, Some(&self.options)).await {
            Ok(response) => {
                debug!(
                    "{} input tokens, {} output tokens, {:?}",
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Err(e) => {
                let message = format!("{}", e);
                warn!("LLM call failed: {}", message);
                Err(StudyError::Upstream { message })
            }
        }
    }
}

/// Build `CompletionOptions` from the generation config.
fn build_options(config: &GenerationConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

// ── OpenAI-compatible HTTP ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generator that posts to `{api_base}/chat/completions`.
pub struct HttpChatGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl HttpChatGenerator {
    pub fn new(api_base: &str, config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for HttpChatGenerator {
    fn name(&self) -> &str {
        "openai-compatible-http"
    }

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, StudyError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!("LLM request to {} failed: {}", self.endpoint, e);
            StudyError::Upstream {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| StudyError::Upstream {
            message: e.to_string(),
        })?;

        if !status.is_success() {
            let message =
                upstream_error_message(&text).unwrap_or_else(|| format!("HTTP {}", status));
            warn!("LLM API returned {}: {}", status, message);
            return Err(StudyError::Upstream { message });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| StudyError::Upstream {
                message: format!("Unreadable response from LLM API: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| StudyError::Upstream {
                message: "LLM API returned no choices".to_string(),
            })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Recognises `{"error": {"message": "…"}}`, `{"error": "…"}` and
/// `{"message": "…"}`.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        None => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
    };
    candidate.filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = GenerationConfig::default();
        let opts = build_options(&config);
        assert_eq!(opts.temperature, Some(0.4));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let config = GenerationConfig::default();
        let g = HttpChatGenerator::new("https://api.example.com/v1/", &config);
        assert_eq!(g.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn error_message_shapes() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#),
            Some("Invalid API key".to_string())
        );
        assert_eq!(
            upstream_error_message(r#"{"error":"quota exceeded"}"#),
            Some("quota exceeded".to_string())
        );
        assert_eq!(
            upstream_error_message(r#"{"message":"model not found"}"#),
            Some("model not found".to_string())
        );
        assert_eq!(upstream_error_message("<html>502</html>"), None);
        assert_eq!(upstream_error_message(r#"{"error":{"message":""}}"#), None);
    }
}
