//! Application error type and API response envelope

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result alias used across the gallery server
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error
///
/// Carries a stable numeric code, a human-readable message and optional
/// structured details. Serializes to the same JSON shape on every route.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct AppError {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message (may be more specific than the code's default)
    pub message: String,
    /// Optional structured context (field names, limits, ids)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, serde_json::Value>,
}

impl AppError {
    /// Create an error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
            details: HashMap::new(),
        }
    }

    /// Create an error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Attach a structured detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.details.insert(key.into(), value);
        }
        self
    }

    // ==================== Convenience Constructors ====================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, message)
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource.into()))
    }

    pub fn photo_not_found(id: impl Into<String>) -> Self {
        Self::new(ErrorCode::PhotoNotFound).with_detail("id", id.into())
    }

    pub fn category_not_found(name: impl Into<String>) -> Self {
        Self::new(ErrorCode::CategoryNotFound).with_detail("name", name.into())
    }

    pub fn order_not_found(id: impl Into<String>) -> Self {
        Self::new(ErrorCode::OrderNotFound).with_detail("id", id.into())
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(ErrorCode::OrderInvalidTransition)
            .with_detail("from", from.into())
            .with_detail("to", to.into())
    }

    pub fn payment_not_configured() -> Self {
        Self::new(ErrorCode::PaymentNotConfigured)
    }

    pub fn signature_invalid(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PaymentSignatureInvalid, message)
    }

    pub fn image_processing(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ImageProcessingFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigError, message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_message(ErrorCode::FileStorageFailed, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_message(ErrorCode::InvalidFormat, err.to_string())
    }
}

/// Standard API response envelope
///
/// Success: `{ "code": 0, "data": ... }`
/// Error:   `{ "code": <nonzero>, "message": "...", "details": {...} }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, serde_json::Value>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            data: Some(data),
            message: None,
            details: HashMap::new(),
        }
    }

    pub fn error(err: AppError) -> Self {
        Self {
            code: err.code.code(),
            data: None,
            message: Some(err.message),
            details: err.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::OrderEmpty);
        assert_eq!(err.message, "Order contains no photos");
    }

    #[test]
    fn test_details_attached() {
        let err = AppError::photo_not_found("a1b2c3d4");
        assert_eq!(err.code, ErrorCode::PhotoNotFound);
        assert_eq!(err.details["id"], serde_json::json!("a1b2c3d4"));
    }

    #[test]
    fn test_success_envelope_shape() {
        let resp = ApiResponse::success(serde_json::json!({"ok": true}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 0);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let resp: ApiResponse<()> =
            ApiResponse::error(AppError::invalid_transition("COMPLETED", "FAILED"));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], 4004);
        assert_eq!(json["details"]["from"], "COMPLETED");
    }
}
