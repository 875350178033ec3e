use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use minidrive_core::{
    DriveError, DriveResult, FileRecord, Identity, NewFileRecord, RecordId, UploadCandidate,
};
use minidrive_db::RecordStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Upload candidate with fixed metadata
pub fn candidate(name: &str, data: &[u8]) -> UploadCandidate {
    UploadCandidate::new(
        name,
        "text/plain",
        data.to_vec(),
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    )
}

/// Record store wrapper that fails one chosen `add` call with `WriteFailed`.
///
/// Calls are counted from 1; every other call is forwarded to `inner`.
pub struct FailingStore {
    inner: Arc<dyn RecordStore>,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn RecordStore>, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn add_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn add(
        &self,
        record: NewFileRecord<'_>,
        owner: Option<&Identity>,
    ) -> DriveResult<RecordId> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(DriveError::WriteFailed(format!(
                "injected failure on {}",
                record.name
            )));
        }
        self.inner.add(record, owner).await
    }

    async fn list_all(&self) -> DriveResult<Vec<FileRecord>> {
        self.inner.list_all().await
    }

    async fn find_by_id(&self, id: RecordId) -> DriveResult<Option<FileRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn delete_by_id(&self, id: RecordId) -> DriveResult<()> {
        self.inner.delete_by_id(id).await
    }
}
