//! Category Repository

use super::{BaseRepository, RepoResult};
use shared::models::Category;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a category; the unique index on `name` rejects duplicates
    pub async fn create(&self, category: Category) -> RepoResult<Category> {
        let created: Option<Category> = self.base.db().create(TABLE).content(category).await?;
        created.ok_or_else(|| super::RepoError::Database("Category insert returned nothing".into()))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM type::table($table) ORDER BY created_at")
            .bind(("table", TABLE))
            .await?;
        Ok(result.take(0)?)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM type::table($table) WHERE name = $name")
            .bind(("table", TABLE))
            .bind(("name", name.to_string()))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Remove a category by name; photo cascade happens at the service layer
    pub async fn delete_by_name(&self, name: &str) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("DELETE type::table($table) WHERE name = $name RETURN BEFORE")
            .bind(("table", TABLE))
            .bind(("name", name.to_string()))
            .await?;
        let deleted: Vec<Category> = result.take(0)?;
        Ok(!deleted.is_empty())
    }
}
