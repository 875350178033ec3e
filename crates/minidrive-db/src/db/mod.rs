//! Database repositories for the data access layer
//!
//! `handle` owns the one-time, versioned database initialization; `files` is the
//! record store; `users` holds credentials and the current-session marker.

pub mod files;
pub mod handle;
pub mod users;

pub use files::{list_visible, RecordStore, SqliteRecordStore};
pub use handle::DatabaseHandle;
pub use users::UserRepository;
