#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use minidrive_db::{DatabaseHandle, SqliteRecordStore, UserRepository};
use minidrive_services::{ArchiveExporter, DriveSession, LocalAuthOracle};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_MAX_FILE_SIZE_BYTES: u64 = 1024 * 1024;

/// Test drive backed by an on-disk SQLite database in a temp directory
pub struct TestDrive {
    pub handle: Arc<DatabaseHandle>,
    pub store: Arc<SqliteRecordStore>,
    pub users: UserRepository,
    pub _temp_dir: TempDir,
}

impl TestDrive {
    /// A session over the real store and the local auth oracle
    pub fn session(&self) -> DriveSession {
        self.session_with_store(self.store.clone())
    }

    /// A session whose writes go through `store` (e.g. a failure-injecting double)
    pub fn session_with_store(&self, store: Arc<dyn minidrive_db::RecordStore>) -> DriveSession {
        DriveSession::new(
            store,
            Arc::new(LocalAuthOracle::new(self.users.clone())),
            ArchiveExporter::new("minidrive_files.zip"),
            TEST_MAX_FILE_SIZE_BYTES,
        )
    }
}

/// Setup a test drive with an isolated, opened database
pub async fn setup_test_drive() -> TestDrive {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let url = format!(
        "sqlite://{}",
        temp_dir.path().join("minidrive.sqlite3").display()
    );

    let handle = Arc::new(DatabaseHandle::with_url(url, Duration::from_secs(5)));
    handle.open().await.expect("Failed to open test database");

    TestDrive {
        store: Arc::new(SqliteRecordStore::new(handle.clone())),
        users: UserRepository::new(handle.clone()),
        handle,
        _temp_dir: temp_dir,
    }
}
