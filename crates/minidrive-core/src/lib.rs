//! MiniDrive Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and the
//! ownership filter shared by every MiniDrive component.

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod ownership;
pub mod validation;

// Re-export commonly used types
pub use config::DriveConfig;
pub use error::{DriveError, DriveResult, ErrorMetadata, LogLevel};
pub use format::format_size;
pub use models::{FileRecord, Identity, NewFileRecord, RecordId, UploadCandidate, UserAccount};
pub use ownership::{filter_visible, is_visible_to};
