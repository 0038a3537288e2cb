use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Coarse error classification, derived from the numeric code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// 0xxx: general / validation errors
    General,
    /// 4xxx: order lifecycle errors
    Order,
    /// 5xxx: payment provider errors
    Payment,
    /// 6xxx: photo, category and upload errors
    Photo,
    /// 9xxx: system errors
    System,
}

impl ErrorCategory {
    /// Derive the category from a raw code value
    pub const fn from_code(code: u16) -> Self {
        match code {
            0..=999 => Self::General,
            4000..=4999 => Self::Order,
            5000..=5999 => Self::Payment,
            6000..=6999 => Self::Photo,
            _ => Self::System,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Photo => "photo",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category this error code belongs to
    pub const fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::OrderInvalidTransition.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::PaymentNotConfigured.category(), ErrorCategory::Payment);
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Photo);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }
}
