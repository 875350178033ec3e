//! MiniDrive Services Layer
//!
//! Staging, commit, export and authentication on top of the record store. The
//! [`DriveSession`] ties them together into the command surface a host drives.

pub mod archive;
pub mod auth;
pub mod commit;
pub mod session;
pub mod workspace;

pub use archive::{ArchiveBlob, ArchiveCodec, ArchiveEntry, ArchiveExporter, ZipCodec};
pub use auth::{hash_secret, AuthOracle, LocalAuthOracle};
pub use commit::{commit, CommitFailure, CommitReport};
pub use session::{Command, CommandOutcome, DriveSession};
pub use workspace::{Mode, RemovedEntry, Sequence, Workspace};
