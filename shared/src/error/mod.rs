//! Unified error handling
//!
//! Every failure in the gallery server flows through [`AppError`]: a stable
//! numeric [`ErrorCode`], a message and optional structured details. Codes
//! map to HTTP statuses in one place so handlers never pick statuses ad hoc.

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
