//! Inbound frame validation rules.

use gigboard_core::error::AppError;

/// Reject frames that are empty or larger than `max_bytes`.
pub fn validate_inbound(raw: &str, max_bytes: usize) -> Result<(), AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::validation(format!(
            "Frame exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty frame"));
    }

    Ok(())
}
