pub mod file;
pub mod user;

pub use file::{FileRecord, NewFileRecord, RecordId, UploadCandidate};
pub use user::{Identity, UserAccount};
