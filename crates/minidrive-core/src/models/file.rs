//! File models: committed records and pending upload candidates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier. Never reused within one store.
pub type RecordId = i64;

/// A file committed to the record store.
///
/// `raw_data` is owned by the store once committed and is never rewritten in place;
/// replacing content means delete + add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: RecordId,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(skip)]
    pub raw_data: Vec<u8>,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// `None` (or an empty string written by older clients) marks a legacy record
    /// that predates owner tagging.
    pub owner: Option<String>,
}

impl FileRecord {
    /// Whether the record carries no usable owner tag.
    pub fn is_unowned(&self) -> bool {
        self.owner.as_deref().map_or(true, str::is_empty)
    }
}

/// Record contents handed to the store; id, creation time and owner are assigned there.
#[derive(Debug, Clone, Copy)]
pub struct NewFileRecord<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub size_bytes: i64,
    pub raw_data: &'a [u8],
    pub last_modified: DateTime<Utc>,
}

/// A file picked by the user but not yet committed. Has no id and no owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub last_modified: DateTime<Utc>,
    pub data: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: Vec<u8>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let size_bytes = i64::try_from(data.len()).unwrap_or(i64::MAX);
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            last_modified,
            data,
        }
    }

    pub fn as_new_record(&self) -> NewFileRecord<'_> {
        NewFileRecord {
            name: &self.name,
            mime_type: &self.mime_type,
            size_bytes: self.size_bytes,
            raw_data: &self.data,
            last_modified: self.last_modified,
        }
    }
}
