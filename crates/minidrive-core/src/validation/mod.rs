//! Input validation for sign-up and file selection.

use crate::error::{DriveError, DriveResult};
use crate::models::UploadCandidate;

pub const MAX_USER_NAME_LENGTH: usize = 64;

/// Validate a user name for registration. Returns the trimmed name.
pub fn validate_user_name(user_name: &str) -> DriveResult<String> {
    let trimmed = user_name.trim();
    if trimmed.is_empty() {
        return Err(DriveError::InvalidInput(
            "User name and password are required".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_USER_NAME_LENGTH {
        return Err(DriveError::InvalidInput(format!(
            "User name must be at most {} characters",
            MAX_USER_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a new secret and its confirmation.
pub fn validate_new_secret(secret: &str, confirmation: &str) -> DriveResult<()> {
    if secret.is_empty() {
        return Err(DriveError::InvalidInput(
            "User name and password are required".to_string(),
        ));
    }
    if secret != confirmation {
        return Err(DriveError::InvalidInput(
            "Passwords do not match".to_string(),
        ));
    }
    Ok(())
}

/// Reject candidates larger than the configured limit.
pub fn validate_candidate_size(
    candidate: &UploadCandidate,
    max_file_size_bytes: u64,
) -> DriveResult<()> {
    let size = u64::try_from(candidate.size_bytes).unwrap_or(0);
    if size > max_file_size_bytes {
        return Err(DriveError::InvalidInput(format!(
            "File '{}' is {} bytes, larger than the {} byte limit",
            candidate.name, size, max_file_size_bytes
        )));
    }
    Ok(())
}
