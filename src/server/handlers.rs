use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StudyError;
use crate::generate::{extract_document, generate_study_material};
use crate::server::models::{GenerateRequest, GenerateResponse, HealthResponse, UploadResponse};
use crate::server::state::AppState;
use crate::server::upload;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Study tool backend is running!".to_string(),
    })
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, StudyError> {
    let multipart = multipart.map_err(|e| StudyError::InvalidRequest(e.body_text()))?;
    let doc = upload::parse_multipart(multipart).await.inspect_err(|e| {
        warn!("Rejected upload: {}", e);
    })?;

    let text = extract_document(
        &doc,
        &state.extractors,
        state.config.upload_dir.as_deref(),
    )
    .await
    .inspect_err(|e| warn!("Extraction of '{}' failed: {}", doc.file_name, e))?;

    Ok(Json(UploadResponse {
        success: true,
        text,
    }))
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, StudyError> {
    let Json(req) = body.map_err(|e| StudyError::InvalidRequest(e.body_text()))?;
    info!("Generation requested for {} chars", req.text.chars().count());

    let outcome = generate_study_material(
        &req.text,
        state.generator.as_ref(),
        &state.config.generation,
    )
    .await?;

    Ok(Json(GenerateResponse {
        success: true,
        result: outcome.material,
        truncated: outcome.truncated,
    }))
}
