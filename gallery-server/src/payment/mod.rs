//! Payment Module
//!
//! Bridge to the external card payment provider. The server signs checkout
//! payloads with its RSA key and verifies the provider's callback signatures
//! against the provider certificate.

mod bridge;
mod canonical;
mod crypto;

pub use bridge::{NotificationVerdict, PaymentBridge};
pub use canonical::build_canonical;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Payment errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment signing key is not provisioned")]
    NotConfigured,

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature verification failed: {0}")]
    SignatureInvalid(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::NotConfigured => AppError::new(ErrorCode::PaymentNotConfigured),
            PaymentError::InvalidKey(msg) => {
                AppError::with_message(ErrorCode::ConfigError, msg)
            }
            PaymentError::Signing(msg) => AppError::with_message(ErrorCode::PaymentFailed, msg),
            PaymentError::SignatureInvalid(msg) => AppError::signature_invalid(msg),
        }
    }
}
