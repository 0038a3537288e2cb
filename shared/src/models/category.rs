use serde::{Deserialize, Serialize};

/// A gallery category (one event, one album)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
}

/// Payload for creating a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
}
