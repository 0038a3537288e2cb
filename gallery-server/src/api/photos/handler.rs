//! Photo API Handlers
//!
//! Uploads are batched: each file runs the full ingest pipeline on its own
//! and one corrupt file never rolls back its siblings.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::core::ServerState;
use crate::db::repository::PhotoRepository;
use crate::services::RewatermarkReport;
use shared::models::{Photo, PhotoUpdate};
use shared::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
pub struct PhotoListQuery {
    pub category: Option<String>,
}

/// Per-file outcome inside a batch upload
#[derive(Debug, Serialize)]
pub struct UploadItem {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Photo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: usize,
    pub items: Vec<UploadItem>,
}

/// GET /api/photos - list photos, optionally filtered by category
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PhotoListQuery>,
) -> AppResult<Json<Vec<Photo>>> {
    let repo = PhotoRepository::new(state.get_db());
    let photos = match query.category.as_deref() {
        Some(category) => repo.find_by_category(category).await,
        None => repo.find_all().await,
    }
    .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(photos))
}

/// GET /api/photos/{id} - fetch one photo
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Photo>> {
    let repo = PhotoRepository::new(state.get_db());
    let photo = repo
        .find_by_id(&id)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::photo_not_found(&id))?;
    Ok(Json(photo))
}

/// POST /api/photos/upload - multipart batch upload
///
/// Expected fields: `category` (required), `price` (optional, applies to the
/// whole batch) and any number of file fields.
pub async fn upload(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadReport>> {
    let mut category: Option<String> = None;
    let mut price: Option<Decimal> = None;
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid_request(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "category" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                category = Some(text);
            }
            "price" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                price = Some(Decimal::from_str(text.trim()).map_err(|_| {
                    AppError::validation(format!("price '{text}' is not a decimal"))
                })?);
            }
            _ => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::invalid_request(format!("Multipart error: {e}")))?;
                files.push((filename, bytes.to_vec()));
            }
        }
    }

    let category =
        category.ok_or_else(|| AppError::validation("category field is required"))?;
    if files.is_empty() {
        return Err(AppError::new(ErrorCode::NoFileProvided));
    }

    let mut items = Vec::with_capacity(files.len());
    let mut uploaded = 0usize;
    for (filename, bytes) in files {
        match state
            .ingest
            .ingest_photo(&filename, &bytes, &category, price)
            .await
        {
            Ok(photo) => {
                uploaded += 1;
                items.push(UploadItem {
                    filename,
                    photo: Some(photo),
                    error: None,
                    code: None,
                });
            }
            Err(err) => {
                tracing::warn!(filename = %filename, "Upload item failed: {err}");
                items.push(UploadItem {
                    filename,
                    photo: None,
                    error: Some(err.message.clone()),
                    code: Some(err.code.code()),
                });
            }
        }
    }

    let failed = items.len() - uploaded;
    tracing::info!(uploaded, failed, category = %category, "Upload batch finished");
    Ok(Json(UploadReport {
        uploaded,
        failed,
        items,
    }))
}

/// PUT /api/photos/{id} - update price and/or category
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PhotoUpdate>,
) -> AppResult<Json<Photo>> {
    let photo = state.ingest.update_photo(&id, payload).await?;
    Ok(Json(photo))
}

/// POST /api/photos/re-watermark - regenerate all previews from originals
pub async fn rewatermark(State(state): State<ServerState>) -> AppResult<Json<RewatermarkReport>> {
    let report = state.ingest.rewatermark_all().await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct DeleteBatchRequest {
    pub ids: Vec<String>,
}

/// Per-id outcome inside a batch delete
#[derive(Debug, Serialize)]
pub struct DeleteItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteReport {
    pub deleted: usize,
    pub failed: usize,
    pub items: Vec<DeleteItem>,
}

/// DELETE /api/photos - batch delete by id list, continue on error
pub async fn delete_batch(
    State(state): State<ServerState>,
    Json(payload): Json<DeleteBatchRequest>,
) -> AppResult<Json<DeleteReport>> {
    if payload.ids.is_empty() {
        return Err(AppError::validation("ids must not be empty"));
    }

    let mut items = Vec::with_capacity(payload.ids.len());
    let mut deleted = 0usize;
    for id in payload.ids {
        match state.ingest.delete_photo(&id).await {
            Ok(_) => {
                deleted += 1;
                items.push(DeleteItem { id, error: None });
            }
            Err(err) => {
                tracing::warn!(photo_id = %id, "Batch delete item failed: {err}");
                items.push(DeleteItem {
                    id,
                    error: Some(err.message.clone()),
                });
            }
        }
    }

    let failed = items.len() - deleted;
    Ok(Json(DeleteReport {
        deleted,
        failed,
        items,
    }))
}

/// DELETE /api/photos/{id} - remove record and files
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Photo>> {
    let deleted = state.ingest.delete_photo(&id).await?;
    tracing::info!(photo_id = %id, "Photo deleted");
    Ok(Json(deleted))
}
