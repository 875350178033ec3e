//! Shared database handle with one-time, versioned initialization.

use minidrive_core::{DriveConfig, DriveError, DriveResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Process-wide handle to the MiniDrive database.
///
/// Created closed. [`DatabaseHandle::open`] connects and applies the schema
/// migrations exactly once; concurrent callers wait on the same initialization.
/// Every repository operation attempted before that fails with
/// [`DriveError::StoreUnavailable`].
pub struct DatabaseHandle {
    database_url: String,
    busy_timeout: Duration,
    pool: OnceCell<Pool<Sqlite>>,
}

impl DatabaseHandle {
    pub fn new(config: &DriveConfig) -> Self {
        Self::with_url(
            config.database_url.clone(),
            Duration::from_secs(config.db_busy_timeout_seconds),
        )
    }

    pub fn with_url(database_url: impl Into<String>, busy_timeout: Duration) -> Self {
        Self {
            database_url: database_url.into(),
            busy_timeout,
            pool: OnceCell::new(),
        }
    }

    /// Open the database and bring the schema up to the current version.
    ///
    /// Migrations are additive; existing records survive every upgrade.
    #[tracing::instrument(skip(self), fields(db.url = %self.database_url))]
    pub async fn open(&self) -> DriveResult<()> {
        self.pool
            .get_or_try_init(|| async {
                let start = std::time::Instant::now();

                let opts = SqliteConnectOptions::from_str(&self.database_url)
                    .map_err(|e| {
                        tracing::error!(error = %e, "Invalid database URL");
                        DriveError::StoreUnavailable
                    })?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .foreign_keys(true)
                    .busy_timeout(self.busy_timeout);

                // One logical writer per process.
                let pool = SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(opts)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Failed to connect to database");
                        DriveError::StoreUnavailable
                    })?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| {
                        DriveError::WriteFailed(format!("Schema migration failed: {}", e))
                    })?;

                tracing::info!(
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Database opened"
                );

                Ok::<_, DriveError>(pool)
            })
            .await?;

        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.pool.initialized()
    }

    pub(crate) fn pool(&self) -> DriveResult<&Pool<Sqlite>> {
        self.pool.get().ok_or(DriveError::StoreUnavailable)
    }
}
