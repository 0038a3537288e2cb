//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::CategoryRepository;
use crate::utils::validation::validate_required_text;
use shared::models::{Category, CategoryCreate};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};

const MAX_NAME_LEN: usize = 64;

#[derive(Debug, Serialize)]
pub struct CategoryDeleted {
    pub name: String,
    pub deleted_photos: usize,
}

/// GET /api/categories - list all categories
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.get_db());
    let categories = repo
        .find_all()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(categories))
}

/// GET /api/categories/{name} - fetch one category
pub async fn get_by_name(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<Category>> {
    let repo = CategoryRepository::new(state.get_db());
    let category = repo
        .find_by_name(&name)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .ok_or_else(|| AppError::category_not_found(&name))?;
    Ok(Json(category))
}

/// POST /api/categories - create a category
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    let name = payload.name.trim().to_string();
    validate_required_text("name", &name, MAX_NAME_LEN)?;

    let repo = CategoryRepository::new(state.get_db());
    if repo
        .find_by_name(&name)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::CategoryNameExists).with_detail("name", name));
    }

    let category = repo
        .create(Category {
            name,
            created_at: now_millis(),
        })
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    tracing::info!(category = %category.name, "Category created");
    Ok(Json(category))
}

/// DELETE /api/categories/{name} - delete a category and all its photos
pub async fn delete(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<CategoryDeleted>> {
    let repo = CategoryRepository::new(state.get_db());
    if repo
        .find_by_name(&name)
        .await
        .map_err(|e| AppError::database(e.to_string()))?
        .is_none()
    {
        return Err(AppError::category_not_found(&name));
    }

    // Photos first so a crash between the two steps leaves no orphans
    let removed = state.ingest.delete_category_photos(&name).await?;
    repo.delete_by_name(&name)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(category = %name, photos = removed.len(), "Category deleted");
    Ok(Json(CategoryDeleted {
        name,
        deleted_photos: removed.len(),
    }))
}
