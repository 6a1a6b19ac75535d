use crate::error::StudyError;
use crate::pipeline::input::UploadedDocument;
use axum::extract::Multipart;

/// Parse a multipart form upload into a classified document.
///
/// Only the `file` field is read; other fields are drained and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedDocument, StudyError> {
    let mut document: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StudyError::InvalidRequest(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        StudyError::InvalidRequest(format!("Failed to read file data: {}", e))
                    })?
                    .to_vec();

                document = Some(UploadedDocument::new(
                    file_name,
                    content_type.as_deref(),
                    data,
                )?);
            }
            _ => {
                field.bytes().await.map_err(|e| {
                    StudyError::InvalidRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
            }
        }
    }

    document.ok_or(StudyError::MissingFile)
}
