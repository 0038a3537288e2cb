//! Photo Repository
//!
//! Photos are keyed by their short id. SurrealDB stores the record id as a
//! `Thing`, so reads either project `record::id(id)` back to a plain string
//! or deserialize into an id-less row and re-attach the known key.

use super::{BaseRepository, RepoError, RepoResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Photo, PhotoUpdate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "photo";

#[derive(Debug, Deserialize)]
struct CountRow {
    count: usize,
}

/// Photo fields as stored in the table, without the record id
#[derive(Debug, Serialize, Deserialize)]
struct PhotoData {
    filename: String,
    original_path: String,
    preview_path: String,
    price: Decimal,
    category: String,
    created_at: i64,
    updated_at: i64,
}

impl PhotoData {
    fn into_photo(self, id: String) -> Photo {
        Photo {
            id,
            filename: self.filename,
            original_path: self.original_path,
            preview_path: self.preview_path,
            price: self.price,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Photo> for PhotoData {
    fn from(photo: &Photo) -> Self {
        Self {
            filename: photo.filename.clone(),
            original_path: photo.original_path.clone(),
            preview_path: photo.preview_path.clone(),
            price: photo.price,
            category: photo.category.clone(),
            created_at: photo.created_at,
            updated_at: photo.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PhotoRepository {
    base: BaseRepository,
}

impl PhotoRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a photo under its short id; fails on id collision
    pub async fn create(&self, photo: Photo) -> RepoResult<Photo> {
        let id = photo.id.clone();
        let data = PhotoData::from(&photo);
        let created: Option<PhotoData> = self
            .base
            .db()
            .create((TABLE, id.as_str()))
            .content(data)
            .await?;
        created
            .map(|d| d.into_photo(id.clone()))
            .ok_or_else(|| RepoError::Duplicate(format!("Photo {} already exists", id)))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Photo>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) ORDER BY created_at",
            )
            .bind(("table", TABLE))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Photo>> {
        let data: Option<PhotoData> = self.base.db().select((TABLE, id)).await?;
        Ok(data.map(|d| d.into_photo(id.to_string())))
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> RepoResult<Vec<Photo>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE record::id(id) IN $ids",
            )
            .bind(("table", TABLE))
            .bind(("ids", ids.to_vec()))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_by_category(&self, category: &str) -> RepoResult<Vec<Photo>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE category = $category ORDER BY created_at",
            )
            .bind(("table", TABLE))
            .bind(("category", category.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Apply a partial update; returns the stored photo or NotFound
    pub async fn update(&self, id: &str, update: PhotoUpdate) -> RepoResult<Photo> {
        let mut patch = serde_json::Map::new();
        if let Some(price) = update.price {
            patch.insert("price".into(), serde_json::to_value(price).unwrap_or_default());
        }
        if let Some(category) = update.category {
            patch.insert("category".into(), serde_json::Value::String(category));
        }
        patch.insert("updated_at".into(), serde_json::Value::from(now_millis()));

        let updated: Option<PhotoData> = self
            .base
            .db()
            .update((TABLE, id))
            .merge(serde_json::Value::Object(patch))
            .await?;
        updated
            .map(|d| d.into_photo(id.to_string()))
            .ok_or_else(|| RepoError::NotFound(format!("Photo {} not found", id)))
    }

    /// Remove a photo record; returns the deleted row for file cleanup
    pub async fn delete(&self, id: &str) -> RepoResult<Option<Photo>> {
        let mut result = self
            .base
            .db()
            .query("SELECT *, record::id(id) AS id FROM type::thing($table, $id)")
            .query("DELETE type::thing($table, $id)")
            .bind(("table", TABLE))
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<Photo> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Remove all photos in a category; returns the deleted rows
    pub async fn delete_by_category(&self, category: &str) -> RepoResult<Vec<Photo>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE category = $category",
            )
            .query("DELETE type::table($table) WHERE category = $category")
            .bind(("table", TABLE))
            .bind(("category", category.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Total number of photos; feeds the cosmetic sequence in filenames
    pub async fn count(&self) -> RepoResult<usize> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM type::table($table) GROUP ALL")
            .bind(("table", TABLE))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }
}
