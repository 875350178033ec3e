//! Error types module
//!
//! All MiniDrive failures are unified under the `DriveError` enum. Storage engine
//! errors are mapped onto `ReadFailed` / `WriteFailed` at the store boundary, so
//! callers never see driver-specific error types.

use crate::models::RecordId;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for conditions the user can correct
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "WRITE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether the operation can be retried as-is
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("Record store is not open")]
    StoreUnavailable,

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Authentication failed: unknown user name or wrong password")]
    AuthenticationFailed,

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("No files selected")]
    EmptySelection,

    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Archive generation failed: {0}")]
    ArchiveGenerationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for MiniDrive operations
pub type DriveResult<T> = Result<T, DriveError>;

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn drive_error_static_metadata(
    err: &DriveError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        DriveError::StoreUnavailable => (
            "STORE_UNAVAILABLE",
            true,
            Some("Retry once the record store has finished opening"),
            LogLevel::Warn,
        ),
        DriveError::ReadFailed(_) => (
            "READ_FAILED",
            false,
            Some("Check the database file and try again"),
            LogLevel::Error,
        ),
        DriveError::WriteFailed(_) => (
            "WRITE_FAILED",
            false,
            Some("Check free disk space and try again"),
            LogLevel::Error,
        ),
        DriveError::AuthenticationRequired => (
            "AUTHENTICATION_REQUIRED",
            false,
            Some("Log in and try again"),
            LogLevel::Debug,
        ),
        DriveError::AuthenticationFailed => (
            "AUTHENTICATION_FAILED",
            false,
            Some("Check the user name and password"),
            LogLevel::Debug,
        ),
        DriveError::UserAlreadyExists(_) => (
            "USER_ALREADY_EXISTS",
            false,
            Some("Choose a different user name"),
            LogLevel::Debug,
        ),
        DriveError::EmptySelection => (
            "EMPTY_SELECTION",
            false,
            Some("Select at least one file"),
            LogLevel::Debug,
        ),
        DriveError::IndexOutOfRange { .. } => (
            "INDEX_OUT_OF_RANGE",
            false,
            Some("Refresh the list and try again"),
            LogLevel::Debug,
        ),
        DriveError::RecordNotFound(_) => (
            "RECORD_NOT_FOUND",
            false,
            Some("Verify the file ID exists"),
            LogLevel::Debug,
        ),
        DriveError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the input and try again"),
            LogLevel::Debug,
        ),
        DriveError::ArchiveGenerationFailed(_) => (
            "ARCHIVE_GENERATION_FAILED",
            false,
            Some("Remove unreadable files from the selection and retry"),
            LogLevel::Error,
        ),
        DriveError::Internal(_) => ("INTERNAL_ERROR", false, None, LogLevel::Error),
    }
}

impl DriveError {
    /// Whether the error is a user-correctable validation condition
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            DriveError::EmptySelection
                | DriveError::IndexOutOfRange { .. }
                | DriveError::InvalidInput(_)
                | DriveError::RecordNotFound(_)
                | DriveError::UserAlreadyExists(_)
        )
    }
}

impl ErrorMetadata for DriveError {
    fn error_code(&self) -> &'static str {
        drive_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        drive_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        drive_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        drive_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            DriveError::StoreUnavailable => "The file database is not ready yet".to_string(),
            DriveError::ReadFailed(_) => "Failed to read stored files".to_string(),
            DriveError::WriteFailed(_) => "Failed to save changes".to_string(),
            DriveError::AuthenticationRequired => "You need to log in first".to_string(),
            DriveError::AuthenticationFailed => "Invalid user name or password".to_string(),
            DriveError::UserAlreadyExists(name) => {
                format!("The user name '{}' is already taken", name)
            }
            DriveError::EmptySelection => "No files are selected".to_string(),
            DriveError::IndexOutOfRange { index, len } => {
                format!("Entry {} does not exist (list has {} entries)", index, len)
            }
            DriveError::RecordNotFound(id) => format!("File {} was not found", id),
            DriveError::InvalidInput(ref msg) => msg.clone(),
            DriveError::ArchiveGenerationFailed(_) => {
                "Failed to generate the ZIP file".to_string()
            }
            DriveError::Internal(_) => "Internal error".to_string(),
        }
    }
}
