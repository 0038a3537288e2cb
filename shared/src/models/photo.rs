use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A photo listed in the storefront
///
/// `original_path` points at the untouched upload on disk; `preview_path`
/// at the watermarked derivative that is safe to serve publicly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    /// Short id, first 8 hex chars of a UUIDv4
    pub id: String,
    /// Sanitized original filename
    pub filename: String,
    /// Relative path of the clean original (never served to buyers pre-purchase)
    pub original_path: String,
    /// Relative path of the watermarked preview
    pub preview_path: String,
    /// Unit price
    pub price: Decimal,
    /// Category name this photo belongs to
    pub category: String,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
    /// Last update timestamp (unix millis)
    pub updated_at: i64,
}

/// Partial update for an existing photo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhotoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn test_photo_serde() {
        let photo = Photo {
            id: "a1b2c3d4".into(),
            filename: "gamos.jpg".into(),
            original_path: "originals/1-a1b2c3d4-clean.jpg".into(),
            preview_path: "previews/1-a1b2c3d4-watermark.jpg".into(),
            price: Decimal::from_f64(5.99).unwrap(),
            category: "wedding".into(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["price"], "5.99");
        let back: Photo = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, "a1b2c3d4");
    }
}
