//! Request and response bodies for the HTTP API.
//!
//! Shared with [`crate::client`], which deserialises the same types.

use crate::material::StudyMaterial;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

/// `POST /upload` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub text: String,
}

/// `POST /generate` request body. A missing `text` is treated as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: String,
}

/// `POST /generate` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub result: StudyMaterial,
    /// True when the text exceeded the input budget and was cut.
    #[serde(default)]
    pub truncated: bool,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
