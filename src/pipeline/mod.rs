//! Pipeline stages for turning an upload into study material.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested on its own and swapped without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ postprocess
//! (stage)   (pdfium/txt) (LLM)   (fences, JSON)
//! ```
//!
//! 1. [`input`]: classify the upload and stage it in a self-deleting temp file
//! 2. [`extract`]: capability-dispatched text extraction; blocking work runs
//!    in `spawn_blocking`
//! 3. [`llm`]: one call to the language model; the only stage with
//!    network I/O
//! 4. [`postprocess`]: truncate input, strip fences, parse the JSON reply

pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
