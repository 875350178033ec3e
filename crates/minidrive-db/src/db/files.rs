//! Record store: durable, owner-tagged file records.

use async_trait::async_trait;
use chrono::Utc;
use minidrive_core::{
    filter_visible, DriveError, DriveResult, FileRecord, Identity, NewFileRecord, RecordId,
};
use sqlx::Sqlite;
use std::sync::Arc;

use super::handle::DatabaseHandle;

/// Storage abstraction for committed file records.
///
/// The store enforces no access control. `list_all` and `find_by_id` are raw reads;
/// code outside the store boundary goes through [`list_visible`] or checks
/// [`is_visible_to`](minidrive_core::is_visible_to) so the ownership filter is
/// always applied.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return its store-assigned id.
    async fn add(
        &self,
        record: NewFileRecord<'_>,
        owner: Option<&Identity>,
    ) -> DriveResult<RecordId>;

    /// Full scan in insertion order.
    async fn list_all(&self) -> DriveResult<Vec<FileRecord>>;

    /// Single record lookup. The default scans `list_all`.
    async fn find_by_id(&self, id: RecordId) -> DriveResult<Option<FileRecord>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|record| record.id == id))
    }

    /// Remove a record. Absent ids are not an error.
    async fn delete_by_id(&self, id: RecordId) -> DriveResult<()>;
}

/// Records visible to `identity`, in store order.
pub async fn list_visible<S>(store: &S, identity: Option<&Identity>) -> DriveResult<Vec<FileRecord>>
where
    S: RecordStore + ?Sized,
{
    let identity = identity.ok_or(DriveError::AuthenticationRequired)?;
    let records = store.list_all().await?;
    filter_visible(records, Some(identity))
}

/// SQLite-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    handle: Arc<DatabaseHandle>,
}

impl SqliteRecordStore {
    pub fn new(handle: Arc<DatabaseHandle>) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[tracing::instrument(
        skip(self, record),
        fields(db.table = "files", name = %record.name, size_bytes = record.size_bytes)
    )]
    async fn add(
        &self,
        record: NewFileRecord<'_>,
        owner: Option<&Identity>,
    ) -> DriveResult<RecordId> {
        let pool = self.handle.pool()?;
        let start = std::time::Instant::now();

        if record.size_bytes < 0 {
            return Err(DriveError::WriteFailed(format!(
                "Negative size for {}",
                record.name
            )));
        }

        let result = sqlx::query::<Sqlite>(
            r#"
            INSERT INTO files (name, mime_type, size_bytes, raw_data, last_modified, created_at, owner)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.name)
        .bind(record.mime_type)
        .bind(record.size_bytes)
        .bind(record.raw_data)
        .bind(record.last_modified)
        .bind(Utc::now())
        .bind(owner.map(Identity::as_str))
        .execute(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "File record insert failed");
            DriveError::WriteFailed(e.to_string())
        })?;

        let id = result.last_insert_rowid();

        tracing::info!(
            record_id = id,
            owner = owner.map(Identity::as_str).unwrap_or(""),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File record committed"
        );

        Ok(id)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files"))]
    async fn list_all(&self) -> DriveResult<Vec<FileRecord>> {
        let pool = self.handle.pool()?;

        let records = sqlx::query_as::<Sqlite, FileRecord>(
            r#"
            SELECT id, name, mime_type, size_bytes, raw_data, last_modified, created_at, owner
            FROM files
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "File record scan failed");
            DriveError::ReadFailed(e.to_string())
        })?;

        tracing::debug!(count = records.len(), "File records scanned");
        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.record_id = id))]
    async fn find_by_id(&self, id: RecordId) -> DriveResult<Option<FileRecord>> {
        let pool = self.handle.pool()?;

        sqlx::query_as::<Sqlite, FileRecord>(
            r#"
            SELECT id, name, mime_type, size_bytes, raw_data, last_modified, created_at, owner
            FROM files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "File record lookup failed");
            DriveError::ReadFailed(e.to_string())
        })
    }

    #[tracing::instrument(skip(self), fields(db.table = "files", db.record_id = id))]
    async fn delete_by_id(&self, id: RecordId) -> DriveResult<()> {
        let pool = self.handle.pool()?;

        let result = sqlx::query::<Sqlite>("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "File record delete failed");
                DriveError::WriteFailed(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            tracing::debug!("No file record to delete");
        } else {
            tracing::info!("File record deleted");
        }

        Ok(())
    }
}
