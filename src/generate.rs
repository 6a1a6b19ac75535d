//! Top-level entry points: extract an upload, generate study material.
//!
//! These are the two operations behind `POST /upload` and `POST /generate`.
//! They are plain async functions so the CLI, the HTTP handlers and tests all
//! share the same code path.

use crate::config::{GenerationConfig, DEFAULT_MODEL};
use crate::error::StudyError;
use crate::material::GenerationOutcome;
use crate::pipeline::extract::ExtractorRegistry;
use crate::pipeline::input::{stage, UploadedDocument};
use crate::pipeline::llm::{HttpChatGenerator, ProviderGenerator, TextGenerator};
use crate::pipeline::postprocess::{parse_study_material, truncate_chars};
use crate::prompts::{generation_prompt, DEFAULT_SYSTEM_PROMPT};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Stage an uploaded document, extract its text and release the staging file.
///
/// # Errors
/// - Validation: unsupported type, no extractable text
/// - Upstream: the extraction engine failed
pub async fn extract_document(
    doc: &UploadedDocument,
    registry: &ExtractorRegistry,
    upload_dir: Option<&Path>,
) -> Result<String, StudyError> {
    info!(
        "Extracting '{}' ({}, {} bytes)",
        doc.file_name,
        doc.content_type.mime(),
        doc.data.len()
    );
    let staged = stage(doc, upload_dir)?;
    registry.extract(staged).await
}

/// Generate flashcards, a quiz and a summary from extracted text.
///
/// The text is cut to `config.max_input_chars` first; the outcome reports
/// whether that happened. Empty text is rejected before any network call.
pub async fn generate_study_material(
    text: &str,
    generator: &dyn TextGenerator,
    config: &GenerationConfig,
) -> Result<GenerationOutcome, StudyError> {
    if text.trim().is_empty() {
        return Err(StudyError::EmptyText);
    }

    let (submitted, truncated) = truncate_chars(text, config.max_input_chars);
    let submitted_chars = submitted.chars().count();
    if truncated {
        warn!(
            "Input truncated to {} of {} chars before generation",
            submitted_chars,
            text.chars().count()
        );
    }

    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let prompt = generation_prompt(submitted);

    let start = Instant::now();
    let raw = generator.complete(system_prompt, &prompt).await?;
    let material = parse_study_material(&raw).inspect_err(|e| {
        warn!("Generator output could not be parsed: {}", e);
    })?;

    info!(
        "Generated {} flashcards, {} quiz items via {} in {}ms",
        material.flashcards.len(),
        material.quiz.len(),
        generator.name(),
        start.elapsed().as_millis()
    );

    Ok(GenerationOutcome {
        material,
        truncated,
        submitted_chars,
    })
}

// ── Generator resolution ─────────────────────────────────────────────────

/// Resolve the generator backend, from most-specific to least-specific.
///
/// 1. **Pre-built generator** (`config.generator`): used as-is.
/// 2. **Explicit endpoint** (`config.api_base`, or only `config.api_key`,
///    which targets the OpenAI endpoint): direct OpenAI-compatible HTTP
///    calls with `config.api_key`.
/// 3. **Named provider** (`config.provider_name`): created through
///    [`ProviderFactory::create_llm_provider`], which reads that provider's
///    API key from the environment.
/// 4. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 5. **OpenAI key present** (`OPENAI_API_KEY`): OpenAI with the configured
///    or default model.
/// 6. **Full auto-detection** ([`ProviderFactory::from_env`]).
pub fn resolve_generator(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>, StudyError> {
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    if let Some(base) = config.effective_api_base() {
        info!("Using OpenAI-compatible endpoint at {}", base);
        return Ok(Arc::new(HttpChatGenerator::new(base, config)));
    }

    let provider = resolve_provider(config)?;
    Ok(Arc::new(ProviderGenerator::new(provider, config)))
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, StudyError> {
    info!("Using provider '{}' with model '{}'", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        StudyError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn resolve_provider(config: &GenerationConfig) -> Result<Arc<dyn LLMProvider>, StudyError> {
    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| StudyError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set STUDY_API_BASE, OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
