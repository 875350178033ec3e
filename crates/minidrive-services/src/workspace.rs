//! In-memory staging state for one session.
//!
//! The workspace holds two ordered sequences: upload candidates picked from the
//! host, and committed records copied into the download selection. Nothing here
//! touches the record store.

use minidrive_core::{DriveError, DriveResult, FileRecord, UploadCandidate};
use serde::{Deserialize, Serialize};

/// Which staging sequence the session is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Upload,
    Download,
}

impl std::str::FromStr for Mode {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upload" => Ok(Mode::Upload),
            "download" => Ok(Mode::Download),
            _ => Err(DriveError::InvalidInput(format!("Unknown mode: {}", s))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Upload => write!(f, "upload"),
            Mode::Download => write!(f, "download"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    UploadCandidates,
    DownloadSelection,
}

impl From<Mode> for Sequence {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Upload => Sequence::UploadCandidates,
            Mode::Download => Sequence::DownloadSelection,
        }
    }
}

/// An entry taken out of a staging sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovedEntry {
    Upload(UploadCandidate),
    Download(FileRecord),
}

impl RemovedEntry {
    pub fn name(&self) -> &str {
        match self {
            RemovedEntry::Upload(candidate) => &candidate.name,
            RemovedEntry::Download(record) => &record.name,
        }
    }
}

/// Per-session staging area.
///
/// Duplicates are allowed in both sequences. Download entries are value copies
/// taken at selection time and are not refreshed if the record later changes.
#[derive(Debug, Default)]
pub struct Workspace {
    mode: Mode,
    upload_candidates: Vec<UploadCandidate>,
    download_selection: Vec<FileRecord>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn upload_candidates(&self) -> &[UploadCandidate] {
        &self.upload_candidates
    }

    pub fn download_selection(&self) -> &[FileRecord] {
        &self.download_selection
    }

    pub fn len(&self, sequence: Sequence) -> usize {
        match sequence {
            Sequence::UploadCandidates => self.upload_candidates.len(),
            Sequence::DownloadSelection => self.download_selection.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upload_candidates.is_empty() && self.download_selection.is_empty()
    }

    /// Append candidates in the order given. Returns the new sequence length.
    pub fn append_upload_candidates<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = UploadCandidate>,
    {
        self.upload_candidates.extend(candidates);
        self.upload_candidates.len()
    }

    /// Append a copy of a committed record. Returns the new sequence length.
    pub fn append_to_download_selection(&mut self, record: FileRecord) -> usize {
        self.download_selection.push(record);
        self.download_selection.len()
    }

    /// Remove exactly one entry, shifting later entries down by one.
    pub fn remove_at(&mut self, sequence: Sequence, index: usize) -> DriveResult<RemovedEntry> {
        let len = self.len(sequence);
        if index >= len {
            return Err(DriveError::IndexOutOfRange { index, len });
        }

        let removed = match sequence {
            Sequence::UploadCandidates => RemovedEntry::Upload(self.upload_candidates.remove(index)),
            Sequence::DownloadSelection => {
                RemovedEntry::Download(self.download_selection.remove(index))
            }
        };
        Ok(removed)
    }

    /// Empty the sequence for the active mode. Returns how many entries were dropped.
    pub fn delete_all(&mut self) -> usize {
        let sequence = Sequence::from(self.mode);
        let removed = self.len(sequence);
        match sequence {
            Sequence::UploadCandidates => self.upload_candidates.clear(),
            Sequence::DownloadSelection => self.download_selection.clear(),
        }
        removed
    }

    /// Empty both sequences. Mode is left as is.
    pub fn clear_all(&mut self) {
        self.upload_candidates.clear();
        self.download_selection.clear();
    }

    /// Change mode. Switching always empties both sequences.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.clear_all();
        self.mode = mode;
    }

    /// Drop the first `count` upload candidates, e.g. the ones a partial commit
    /// already persisted. Returns how many were dropped.
    pub fn discard_committed_prefix(&mut self, count: usize) -> usize {
        let count = count.min(self.upload_candidates.len());
        self.upload_candidates.drain(..count);
        count
    }

    pub(crate) fn clear_upload_candidates(&mut self) {
        self.upload_candidates.clear();
    }
}
