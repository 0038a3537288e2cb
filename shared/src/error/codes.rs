//! Unified error codes for the gallery storefront
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Photo / category / upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no photos
    OrderEmpty = 4002,
    /// Order amount is not positive
    OrderInvalidAmount = 4003,
    /// Illegal order status transition
    OrderInvalidTransition = 4004,
    /// Client total does not match server-computed total
    OrderTotalMismatch = 4005,
    /// Provider reference already attached with a different value
    ProviderReferenceConflict = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment signing key is not provisioned
    PaymentNotConfigured = 5001,
    /// Notification signature failed verification
    PaymentSignatureInvalid = 5002,
    /// Payment processing failed
    PaymentFailed = 5003,

    // ==================== 6xxx: Photo / Category ====================
    /// Photo not found
    PhotoNotFound = 6001,
    /// Photo id already exists
    PhotoIdExists = 6002,
    /// Photo has invalid price
    PhotoInvalidPrice = 6003,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6102,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// No filename provided
    NoFilename = 6506,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,
    /// Watermark overlay does not fit the output canvas
    WatermarkTooLarge = 6510,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order contains no photos",
            ErrorCode::OrderInvalidAmount => "Order amount must be positive",
            ErrorCode::OrderInvalidTransition => "Illegal order status transition",
            ErrorCode::OrderTotalMismatch => "Order total does not match photo prices",
            ErrorCode::ProviderReferenceConflict => {
                "Provider reference already attached with a different value"
            }

            // Payment
            ErrorCode::PaymentNotConfigured => "Payment signing key is not provisioned",
            ErrorCode::PaymentSignatureInvalid => "Notification signature verification failed",
            ErrorCode::PaymentFailed => "Payment processing failed",

            // Photo / Category
            ErrorCode::PhotoNotFound => "Photo not found",
            ErrorCode::PhotoIdExists => "Photo id already exists",
            ErrorCode::PhotoInvalidPrice => "Photo has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::WatermarkTooLarge => "Watermark overlay does not fit the output canvas",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderEmpty,
            4003 => Self::OrderInvalidAmount,
            4004 => Self::OrderInvalidTransition,
            4005 => Self::OrderTotalMismatch,
            4006 => Self::ProviderReferenceConflict,

            5001 => Self::PaymentNotConfigured,
            5002 => Self::PaymentSignatureInvalid,
            5003 => Self::PaymentFailed,

            6001 => Self::PhotoNotFound,
            6002 => Self::PhotoIdExists,
            6003 => Self::PhotoInvalidPrice,
            6101 => Self::CategoryNotFound,
            6102 => Self::CategoryNameExists,

            6501 => Self::FileTooLarge,
            6502 => Self::UnsupportedFileFormat,
            6503 => Self::InvalidImageFile,
            6504 => Self::NoFileProvided,
            6505 => Self::EmptyFile,
            6506 => Self::NoFilename,
            6508 => Self::ImageProcessingFailed,
            6509 => Self::FileStorageFailed,
            6510 => Self::WatermarkTooLarge,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9005 => Self::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::OrderInvalidTransition,
            ErrorCode::PaymentNotConfigured,
            ErrorCode::WatermarkTooLarge,
            ErrorCode::DatabaseError,
        ] {
            let raw = code.code();
            assert_eq!(ErrorCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(12345), Err(InvalidErrorCode(12345)));
    }

    #[test]
    fn test_serde_as_u16() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let back: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(back, ErrorCode::OrderNotFound);
    }
}
