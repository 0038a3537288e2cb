//! Photo ingest pipeline
//!
//! Validates an uploaded file, renders the watermarked preview, writes both
//! variants to disk and registers the photo record. The clean original never
//! leaves the originals directory.

use crate::core::Config;
use crate::db::repository::{CategoryRepository, PhotoRepository, RepoError};
use crate::watermark::WatermarkCompositor;
use image::ImageFormat;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Photo, PhotoUpdate};
use shared::util::{now_millis, sanitize_filename, short_id};
use shared::{AppError, AppResult, ErrorCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Accepted upload formats
const SUPPORTED_FORMATS: &[ImageFormat] =
    &[ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Outcome of a re-watermark pass over the whole catalog
#[derive(Debug, Default, Serialize)]
pub struct RewatermarkReport {
    pub total: usize,
    pub refreshed: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Clone)]
pub struct IngestService {
    photos: PhotoRepository,
    categories: CategoryRepository,
    compositor: Arc<WatermarkCompositor>,
    config: Config,
}

impl IngestService {
    pub fn new(db: Surreal<Db>, compositor: Arc<WatermarkCompositor>, config: Config) -> Self {
        Self {
            photos: PhotoRepository::new(db.clone()),
            categories: CategoryRepository::new(db),
            compositor,
            config,
        }
    }

    /// Run the full pipeline for one uploaded file
    pub async fn ingest_photo(
        &self,
        original_name: &str,
        bytes: &[u8],
        category: &str,
        price: Option<Decimal>,
    ) -> AppResult<Photo> {
        self.validate_upload(original_name, bytes)?;

        let exists = self
            .categories
            .find_by_name(category)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if exists.is_none() {
            return Err(AppError::category_not_found(category));
        }

        let price = price.unwrap_or(self.config.default_price);
        if price <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::PhotoInvalidPrice).with_detail("price", price));
        }

        let format = image::guess_format(bytes).map_err(|_| {
            AppError::new(ErrorCode::UnsupportedFileFormat).with_detail("filename", original_name)
        })?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(AppError::new(ErrorCode::UnsupportedFileFormat)
                .with_detail("format", format!("{format:?}")));
        }
        let decoded = image::load_from_memory(bytes).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidImageFile, e.to_string())
                .with_detail("filename", original_name)
        })?;

        // Preview rendering happens before anything touches disk
        let preview_bytes = self.compositor.render_preview(&decoded).map_err(AppError::from)?;

        let id = short_id();
        let seq = self
            .photos
            .count()
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            + 1;
        let ext = extension_for(format);
        let original_file = format!("{seq}-{id}-clean.{ext}");
        let preview_file = format!("{seq}-{id}-watermark.jpg");

        let original_path = self.config.originals_dir().join(&original_file);
        let preview_path = self.config.previews_dir().join(&preview_file);

        tokio::fs::write(&original_path, bytes)
            .await
            .map_err(|e| storage_error(&original_path, e))?;
        if let Err(e) = tokio::fs::write(&preview_path, &preview_bytes).await {
            let _ = tokio::fs::remove_file(&original_path).await;
            return Err(storage_error(&preview_path, e));
        }

        let now = now_millis();
        let photo = Photo {
            id: id.clone(),
            filename: sanitize_filename(original_name),
            original_path: format!("originals/{original_file}"),
            preview_path: format!("previews/{preview_file}"),
            price,
            category: category.to_string(),
            created_at: now,
            updated_at: now,
        };

        match self.photos.create(photo).await {
            Ok(created) => {
                tracing::info!(photo_id = %id, category = %category, "Photo ingested");
                Ok(created)
            }
            Err(err) => {
                // Keep the filesystem consistent with the database
                let _ = tokio::fs::remove_file(&original_path).await;
                let _ = tokio::fs::remove_file(&preview_path).await;
                Err(match err {
                    RepoError::Duplicate(msg) => {
                        AppError::with_message(ErrorCode::PhotoIdExists, msg)
                    }
                    other => AppError::database(other.to_string()),
                })
            }
        }
    }

    /// Apply a partial update to a photo
    ///
    /// A category reassignment only goes through when the target category
    /// exists, so the cascade delete contract keeps holding.
    pub async fn update_photo(&self, id: &str, patch: PhotoUpdate) -> AppResult<Photo> {
        if let Some(price) = patch.price
            && price <= Decimal::ZERO
        {
            return Err(AppError::new(ErrorCode::PhotoInvalidPrice).with_detail("price", price));
        }
        if let Some(category) = patch.category.as_deref() {
            let exists = self
                .categories
                .find_by_name(category)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            if exists.is_none() {
                return Err(AppError::category_not_found(category));
            }
        }
        self.photos.update(id, patch).await.map_err(|e| match e {
            RepoError::NotFound(_) => AppError::photo_not_found(id),
            other => AppError::database(other.to_string()),
        })
    }

    /// Regenerate every preview from the stored clean originals
    ///
    /// Run after changing the watermark label or layout, when the previews on
    /// disk no longer match the configured overlay. Continues past per-photo
    /// failures; a photo whose original went missing is skipped and keeps its
    /// old preview.
    pub async fn rewatermark_all(&self) -> AppResult<RewatermarkReport> {
        let photos = self
            .photos
            .find_all()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        let images_dir = PathBuf::from(&self.config.work_dir).join("images");

        let mut report = RewatermarkReport {
            total: photos.len(),
            ..RewatermarkReport::default()
        };
        for photo in &photos {
            let original = images_dir.join(&photo.original_path);
            let bytes = match tokio::fs::read(&original).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, path = %original.display(),
                        "Original missing, keeping old preview: {e}");
                    report.skipped += 1;
                    continue;
                }
            };
            let preview = images_dir.join(&photo.preview_path);
            match self.render_preview_to(&bytes, &preview).await {
                Ok(()) => report.refreshed += 1,
                Err(err) => {
                    tracing::warn!(photo_id = %photo.id, "Re-watermark failed: {err}");
                    report.failed += 1;
                }
            }
        }
        tracing::info!(
            total = report.total,
            refreshed = report.refreshed,
            failed = report.failed,
            skipped = report.skipped,
            "Re-watermark pass finished"
        );
        Ok(report)
    }

    /// Decode an original and overwrite its preview file
    async fn render_preview_to(&self, bytes: &[u8], preview_path: &Path) -> AppResult<()> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| AppError::with_message(ErrorCode::InvalidImageFile, e.to_string()))?;
        let preview = self.compositor.render_preview(&decoded).map_err(AppError::from)?;
        tokio::fs::write(preview_path, &preview)
            .await
            .map_err(|e| storage_error(preview_path, e))?;
        Ok(())
    }

    /// Remove a photo's record and both files
    pub async fn delete_photo(&self, id: &str) -> AppResult<Photo> {
        let deleted = self
            .photos
            .delete(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::photo_not_found(id))?;
        self.remove_photo_files(&deleted).await;
        Ok(deleted)
    }

    /// Remove all photos of a category, records first, then files
    pub async fn delete_category_photos(&self, category: &str) -> AppResult<Vec<Photo>> {
        let deleted = self
            .photos
            .delete_by_category(category)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        for photo in &deleted {
            self.remove_photo_files(photo).await;
        }
        Ok(deleted)
    }

    /// Best-effort file cleanup; a missing file only logs a warning
    async fn remove_photo_files(&self, photo: &Photo) {
        let images_dir = PathBuf::from(&self.config.work_dir).join("images");
        for rel in [&photo.original_path, &photo.preview_path] {
            let path = images_dir.join(rel);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), "Could not remove photo file: {e}");
            }
        }
    }

    fn validate_upload(&self, original_name: &str, bytes: &[u8]) -> AppResult<()> {
        if original_name.trim().is_empty() {
            return Err(AppError::new(ErrorCode::NoFilename));
        }
        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile).with_detail("filename", original_name));
        }
        if bytes.len() > self.config.max_upload_bytes {
            return Err(AppError::new(ErrorCode::FileTooLarge)
                .with_detail("filename", original_name)
                .with_detail("size", bytes.len())
                .with_detail("limit", self.config.max_upload_bytes));
        }
        Ok(())
    }
}

fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        _ => "jpg",
    }
}

fn storage_error(path: &std::path::Path, err: std::io::Error) -> AppError {
    AppError::with_message(ErrorCode::FileStorageFailed, err.to_string())
        .with_detail("path", path.display().to_string())
}
