//! # studydeck
//!
//! Turn uploaded notes (PDF or plain text) into flashcards, a multiple-choice
//! quiz and a summary with a language model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Input     classify by MIME type / extension, stage in a temp file
//!  ├─ 2. Extract   pdfium or UTF-8 text (spawn_blocking), collapse whitespace
//!  │                 ── POST /upload returns the text; the temp file is gone
//!  ├─ 3. Truncate  cap the text at the input budget (12 000 chars by default)
//!  ├─ 4. LLM       one prompt asking for strict JSON
//!  └─ 5. Parse     strip code fences, decode StudyMaterial
//!                    ── POST /generate returns the material
//! ```
//!
//! The [`server`] module exposes these stages over HTTP; the [`client`]
//! module holds the view state machine and the transport that drives it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use studydeck::server::{self, AppState};
//! use studydeck::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Generator auto-detected from OPENAI_API_KEY / EDGEQUAKE_LLM_PROVIDER
//!     let config = ServerConfig::builder().port(5000).build()?;
//!     let state = AppState::from_config(config)?;
//!     server::serve(Arc::new(state)).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `studydeck` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod generate;
pub mod material;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    GenerationConfig, GenerationConfigBuilder, ServerConfig, ServerConfigBuilder,
    DEFAULT_API_BASE, DEFAULT_MAX_INPUT_CHARS, DEFAULT_MODEL,
};
pub use error::{ErrorKind, StudyError, INVALID_OUTPUT_MESSAGE};
pub use generate::{extract_document, generate_study_material, resolve_generator};
pub use material::{Flashcard, GenerationOutcome, QuizItem, StudyMaterial};
pub use pipeline::input::{ContentType, UploadedDocument};
pub use pipeline::llm::{HttpChatGenerator, ProviderGenerator, TextGenerator};
