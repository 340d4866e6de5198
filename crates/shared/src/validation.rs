//! Common validation utilities.

use validator::ValidationError;

/// Maximum length for free-text reason fields.
pub const MAX_REASON_LENGTH: usize = 2000;

/// Maximum number of attachment URLs on a single ticket or chat entry.
pub const MAX_FILE_URLS: usize = 20;

/// Validates that a string is non-empty after trimming.
pub fn validate_non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("non_blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a free-text reason field: non-blank and within length bounds.
pub fn validate_reason(value: &str) -> Result<(), ValidationError> {
    validate_non_blank(value)?;
    if value.len() > MAX_REASON_LENGTH {
        let mut err = ValidationError::new("reason_length");
        err.message = Some("Reason is too long".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an attachment URL list: bounded size, no blank entries.
pub fn validate_file_urls(urls: &[String]) -> Result<(), ValidationError> {
    if urls.len() > MAX_FILE_URLS {
        let mut err = ValidationError::new("file_urls_count");
        err.message = Some("Too many attachments".into());
        return Err(err);
    }
    if urls.iter().any(|u| u.trim().is_empty()) {
        let mut err = ValidationError::new("file_urls_blank");
        err.message = Some("Attachment URLs must not be blank".into());
        return Err(err);
    }
    Ok(())
}
