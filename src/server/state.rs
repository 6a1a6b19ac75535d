use crate::config::ServerConfig;
use crate::error::StudyError;
use crate::generate::resolve_generator;
use crate::pipeline::extract::ExtractorRegistry;
use crate::pipeline::llm::TextGenerator;
use std::sync::Arc;

/// Shared application state accessible from all handlers.
///
/// Read-only after start-up; each request is independent.
pub struct AppState {
    pub config: ServerConfig,
    pub extractors: ExtractorRegistry,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    /// Build the state from configuration, resolving the generator backend once.
    pub fn from_config(config: ServerConfig) -> Result<Self, StudyError> {
        let generator = resolve_generator(&config.generation)?;
        let extractors = ExtractorRegistry::with_defaults(config.pdfium_lib_path.clone());
        Ok(Self {
            config,
            extractors,
            generator,
        })
    }
}
