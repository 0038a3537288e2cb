//! HTTP status mapping and axum response integration

use super::codes::ErrorCode;
use super::types::{ApiResponse, AppError};
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

impl ErrorCode {
    /// Map the error code to an HTTP status
    pub const fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::Success => StatusCode::OK,

            // Not found family
            ErrorCode::NotFound
            | ErrorCode::OrderNotFound
            | ErrorCode::PhotoNotFound
            | ErrorCode::CategoryNotFound => StatusCode::NOT_FOUND,

            // Conflict family
            ErrorCode::AlreadyExists
            | ErrorCode::OrderInvalidTransition
            | ErrorCode::ProviderReferenceConflict
            | ErrorCode::PhotoIdExists
            | ErrorCode::CategoryNameExists => StatusCode::CONFLICT,

            // Payload too large
            ErrorCode::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // Unsupported media
            ErrorCode::UnsupportedFileFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            // Not provisioned
            ErrorCode::PaymentNotConfigured => StatusCode::SERVICE_UNAVAILABLE,

            // System errors
            ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::ConfigError
            | ErrorCode::ImageProcessingFailed
            | ErrorCode::FileStorageFailed
            | ErrorCode::WatermarkTooLarge => StatusCode::INTERNAL_SERVER_ERROR,

            // Everything else is a client-side problem
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        let body: ApiResponse<()> = ApiResponse::error(self);
        (status, Json(body)).into_response()
    }
}

impl<T: serde::Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = match ErrorCode::try_from(self.code) {
            Ok(code) => code.http_status(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}
