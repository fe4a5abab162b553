//! Image upload route
//!
//! Relays a multipart file to the image store and returns its public URL.

use axum::{Json, extract::{Multipart, State}, response::IntoResponse};
use serde_json::json;
use tracing::error;

use crate::{error::ApiError, state::AppState};

/// Upload one image and return its public URL
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart field: {}", e);
        ApiError::BadRequest("Malformed multipart body".to_string())
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| {
            error!("Failed to read uploaded file: {}", e);
            ApiError::BadRequest("Malformed multipart body".to_string())
        })?;

        let url = state
            .image_store
            .upload(&file_name, &content_type, bytes.to_vec())
            .await
            .map_err(|e| {
                error!("Image upload failed: {}", e);
                ApiError::Upstream("Image upload failed".to_string())
            })?;

        return Ok(Json(json!({
            "success": true,
            "url": url,
        })));
    }

    Err(ApiError::BadRequest("No file attached".to_string()))
}
