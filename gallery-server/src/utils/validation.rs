//! Input validation helpers

use shared::{AppError, AppResult};

/// RFC 5321 limit on mailbox length
pub const MAX_EMAIL_LEN: usize = 254;

/// Reject empty or overly long text fields
pub fn validate_required_text(field: &str, value: &str, max_len: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Shallow email shape check; delivery failures are handled downstream
pub fn validate_email(email: &str) -> AppResult<()> {
    validate_required_text("email", email, MAX_EMAIL_LEN)?;
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::validation("email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::validation("email has an invalid shape"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("buyer@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.gr").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_required_text_limits() {
        assert!(validate_required_text("name", "wedding", 64).is_ok());
        assert!(validate_required_text("name", "   ", 64).is_err());
        assert!(validate_required_text("name", &"x".repeat(65), 64).is_err());
    }
}
