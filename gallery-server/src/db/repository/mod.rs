//! Repository Module
//!
//! CRUD operations over the embedded SurrealDB tables.

pub mod category;
pub mod order;
pub mod photo;

pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use photo::PhotoRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let text = err.to_string();
        // Unique index violations surface as plain database errors; keep the
        // distinction so handlers can answer 409 instead of 500.
        if text.contains("already exists") || text.contains("idx_") {
            RepoError::Duplicate(text)
        } else {
            RepoError::Database(text)
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
