//! Configuration types for the study-material service.
//!
//! Two structs cover every knob:
//!
//! * [`GenerationConfig`]: how extracted text becomes a prompt and which
//!   language-model backend answers it.
//! * [`ServerConfig`]: the HTTP surface (port, CORS origin, upload limits)
//!   plus the extraction engine location and a [`GenerationConfig`].
//!
//! Both are built through validating builders. Everything the process needs
//! is passed in explicitly at start-up; nothing is read from ambient globals
//! after that.

use crate::error::StudyError;
use crate::pipeline::llm::TextGenerator;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default character budget for text sent to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 12_000;

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Endpoint used when an API key is configured without a base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Settings for the generation step.
///
/// # Example
/// ```rust
/// use studydeck::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .model("gpt-4.1-mini")
///     .max_input_chars(8_000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_input_chars, 8_000);
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// Ignored when `api_base` or `generator` is set.
    pub provider_name: Option<String>,

    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    ///
    /// When set, requests go straight to `{api_base}/chat/completions`
    /// with `api_key` as bearer token instead of through a named provider.
    pub api_base: Option<String>,

    /// API key for `api_base`. Set on its own, it targets [`DEFAULT_API_BASE`].
    pub api_key: Option<String>,

    /// Pre-constructed generator. Takes precedence over everything else.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Sampling temperature. Default: 0.4.
    pub temperature: f32,

    /// Maximum tokens the model may produce. Default: 2048.
    pub max_tokens: usize,

    /// Maximum number of characters of extracted text sent to the model.
    /// Anything beyond is dropped. Default: 12 000.
    pub max_input_chars: usize,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            api_base: None,
            api_key: None,
            generator: None,
            temperature: 0.4,
            max_tokens: 2048,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }

    /// Base URL for direct HTTP calls: `api_base`, or [`DEFAULT_API_BASE`]
    /// when only an API key was given.
    pub fn effective_api_base(&self) -> Option<&str> {
        match (self.api_base.as_deref(), self.api_key.as_deref()) {
            (Some(base), _) => Some(base),
            (None, Some(key)) if !key.trim().is_empty() => Some(DEFAULT_API_BASE),
            _ => None,
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.config.api_base = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, StudyError> {
        let c = &self.config;
        if c.max_input_chars == 0 {
            return Err(StudyError::InvalidConfig(
                "max_input_chars must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(StudyError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if let Some(ref base) = c.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(StudyError::InvalidConfig(format!(
                    "api_base must be an HTTP/HTTPS URL, got '{base}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Server ───────────────────────────────────────────────────────────────

/// Smallest accepted request body limit.
pub const MIN_UPLOAD_BYTES: usize = 1024;

/// Settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to listen on. Default: 5000.
    pub port: u16,

    /// Origin allowed by the CORS policy. Default: `http://localhost:5173`.
    pub allowed_origin: String,

    /// Directory uploads are staged in during extraction.
    /// If None, the system temp directory is used.
    pub upload_dir: Option<PathBuf>,

    /// Maximum request body size in bytes. Default: 10 MiB.
    pub max_upload_bytes: usize,

    /// Directory containing the pdfium shared library.
    /// If None, the system library search path is used.
    pub pdfium_lib_path: Option<PathBuf>,

    pub generation: GenerationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            allowed_origin: "http://localhost:5173".to_string(),
            upload_dir: None,
            max_upload_bytes: 10 * 1024 * 1024,
            pdfium_lib_path: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.allowed_origin = origin.into();
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = Some(dir.into());
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn pdfium_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(dir.into());
        self
    }

    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.config.generation = generation;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, StudyError> {
        let c = &self.config;
        if axum::http::HeaderValue::from_str(&c.allowed_origin).is_err() {
            return Err(StudyError::InvalidConfig(format!(
                "allowed origin '{}' is not a valid header value",
                c.allowed_origin
            )));
        }
        if c.max_upload_bytes < MIN_UPLOAD_BYTES {
            return Err(StudyError::InvalidConfig(format!(
                "max_upload_bytes must be at least {MIN_UPLOAD_BYTES}, got {}",
                c.max_upload_bytes
            )));
        }
        if let Some(ref dir) = c.upload_dir {
            if !dir.is_dir() {
                return Err(StudyError::InvalidConfig(format!(
                    "upload directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults() {
        let c = GenerationConfig::default();
        assert_eq!(c.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
        assert_eq!(c.max_tokens, 2048);
        assert!(c.generator.is_none());
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = GenerationConfig::builder().max_input_chars(0).build();
        assert!(matches!(err, Err(StudyError::InvalidConfig(_))));
    }

    #[test]
    fn api_base_must_be_http() {
        let err = GenerationConfig::builder().api_base("ftp://x").build();
        assert!(err.is_err());
        let ok = GenerationConfig::builder()
            .api_base("https://api.openai.com/v1")
            .build();
        assert!(ok.is_ok());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = GenerationConfig::builder()
            .api_key("sk-secret")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"), "got: {dbg}");
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn key_without_base_targets_default_endpoint() {
        let c = GenerationConfig::builder()
            .api_key("sk-configured")
            .build()
            .unwrap();
        assert_eq!(c.effective_api_base(), Some(DEFAULT_API_BASE));

        let c = GenerationConfig::builder()
            .api_key("sk-configured")
            .api_base("http://localhost:11434/v1")
            .build()
            .unwrap();
        assert_eq!(c.effective_api_base(), Some("http://localhost:11434/v1"));

        assert_eq!(GenerationConfig::default().effective_api_base(), None);
    }

    #[test]
    fn tiny_upload_limit_is_rejected() {
        let err = ServerConfig::builder().max_upload_bytes(10).build();
        assert!(matches!(err, Err(StudyError::InvalidConfig(_))));
        let ok = ServerConfig::builder()
            .max_upload_bytes(MIN_UPLOAD_BYTES)
            .build()
            .unwrap();
        assert_eq!(ok.max_upload_bytes, MIN_UPLOAD_BYTES);
    }

    #[test]
    fn server_rejects_missing_upload_dir() {
        let err = ServerConfig::builder()
            .upload_dir("/definitely/not/a/dir")
            .build();
        assert!(matches!(err, Err(StudyError::InvalidConfig(_))));
    }

    #[test]
    fn server_defaults() {
        let c = ServerConfig::builder().build().unwrap();
        assert_eq!(c.port, 5000);
        assert_eq!(c.allowed_origin, "http://localhost:5173");
    }
}
