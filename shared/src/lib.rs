//! Shared types for the gallery storefront
//!
//! Domain models, unified error codes and the API response envelope used by
//! the gallery server. Kept free of persistence and HTTP-handler concerns so
//! the same types can serve future clients (admin tooling, importers).

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
