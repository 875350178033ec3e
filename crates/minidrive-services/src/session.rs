//! Session context and command layer.
//!
//! A [`DriveSession`] owns everything one user session touches: the store handle,
//! the acting identity and the workspace. Mutating commands take `&mut self`, so a
//! session never runs two commands at once.

use minidrive_core::validation::validate_candidate_size;
use minidrive_core::{
    is_visible_to, DriveError, DriveResult, FileRecord, Identity, RecordId, UploadCandidate,
    UserAccount,
};
use minidrive_db::{list_visible, RecordStore};
use std::sync::Arc;

use crate::archive::{ArchiveBlob, ArchiveExporter};
use crate::auth::AuthOracle;
use crate::commit::{commit, CommitReport};
use crate::workspace::{Mode, RemovedEntry, Sequence, Workspace};

/// A user action, as raised by the host.
#[derive(Debug)]
pub enum Command {
    SignUp {
        user_name: String,
        secret: String,
        confirmation: String,
    },
    LogIn {
        user_name: String,
        secret: String,
    },
    LogOut,
    SwitchMode(Mode),
    AddUploadCandidates(Vec<UploadCandidate>),
    CommitUploads,
    ListFiles,
    SelectForDownload(RecordId),
    RemoveEntry(usize),
    DeleteAll,
    DeleteRecord(RecordId),
    Export,
}

#[derive(Debug)]
pub enum CommandOutcome {
    SignedUp(UserAccount),
    LoggedIn(Identity),
    LoggedOut,
    ModeSwitched(Mode),
    CandidatesAdded { total: usize },
    Committed(CommitReport),
    Files(Vec<FileRecord>),
    Selected { total: usize },
    Removed(RemovedEntry),
    Cleared { removed: usize },
    RecordDeleted(RecordId),
    Exported(ArchiveBlob),
}

pub struct DriveSession {
    store: Arc<dyn RecordStore>,
    auth: Arc<dyn AuthOracle>,
    exporter: ArchiveExporter,
    max_file_size_bytes: u64,
    identity: Option<Identity>,
    workspace: Workspace,
}

impl DriveSession {
    pub fn new(
        store: Arc<dyn RecordStore>,
        auth: Arc<dyn AuthOracle>,
        exporter: ArchiveExporter,
        max_file_size_bytes: u64,
    ) -> Self {
        Self {
            store,
            auth,
            exporter,
            max_file_size_bytes,
            identity: None,
            workspace: Workspace::new(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Pick up the identity the oracle remembers from an earlier sign-in.
    pub async fn restore(&mut self) -> DriveResult<Option<&Identity>> {
        let identity = self.auth.current_identity().await?;
        self.set_identity(identity);
        Ok(self.identity.as_ref())
    }

    pub async fn sign_up(
        &mut self,
        user_name: &str,
        secret: &str,
        confirmation: &str,
    ) -> DriveResult<UserAccount> {
        self.auth.register(user_name, secret, confirmation).await
    }

    pub async fn log_in(&mut self, user_name: &str, secret: &str) -> DriveResult<Identity> {
        let identity = self.auth.authenticate(user_name, secret).await?;
        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    pub async fn log_out(&mut self) -> DriveResult<()> {
        self.auth.sign_out().await?;
        self.set_identity(None);
        Ok(())
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        tracing::debug!(%mode, "Switching mode");
        self.workspace.switch_mode(mode);
    }

    /// Stage files for upload. Every candidate is size-checked before any is added.
    pub fn add_upload_candidates(&mut self, candidates: Vec<UploadCandidate>) -> DriveResult<usize> {
        self.require_mode(Mode::Upload)?;
        for candidate in &candidates {
            validate_candidate_size(candidate, self.max_file_size_bytes)?;
        }
        Ok(self.workspace.append_upload_candidates(candidates))
    }

    /// Commit every staged candidate for the current identity.
    ///
    /// The upload sequence is cleared only when the whole batch succeeds; after a
    /// partial failure it is left exactly as it was.
    pub async fn commit_uploads(&mut self) -> DriveResult<CommitReport> {
        let report = commit(
            self.store.as_ref(),
            self.workspace.upload_candidates(),
            self.identity.as_ref(),
        )
        .await?;

        if report.is_complete() {
            self.workspace.clear_upload_candidates();
        }
        Ok(report)
    }

    pub async fn list_files(&self) -> DriveResult<Vec<FileRecord>> {
        list_visible(self.store.as_ref(), self.identity.as_ref()).await
    }

    /// Copy a visible record into the download selection.
    pub async fn select_for_download(&mut self, id: RecordId) -> DriveResult<usize> {
        self.require_mode(Mode::Download)?;
        let record = self.find_visible(id).await?;
        Ok(self.workspace.append_to_download_selection(record))
    }

    /// Remove one entry from the sequence of the active mode.
    pub fn remove_entry(&mut self, index: usize) -> DriveResult<RemovedEntry> {
        let sequence = Sequence::from(self.workspace.mode());
        self.workspace.remove_at(sequence, index)
    }

    pub fn delete_all(&mut self) -> usize {
        self.workspace.delete_all()
    }

    /// Permanently delete a committed record visible to the current identity.
    #[tracing::instrument(skip(self), fields(record_id = id))]
    pub async fn delete_record(&mut self, id: RecordId) -> DriveResult<()> {
        self.find_visible(id).await?;
        self.store.delete_by_id(id).await
    }

    pub async fn export(&self) -> DriveResult<ArchiveBlob> {
        self.exporter.export(self.workspace.download_selection()).await
    }

    pub async fn execute(&mut self, command: Command) -> DriveResult<CommandOutcome> {
        let outcome = match command {
            Command::SignUp {
                user_name,
                secret,
                confirmation,
            } => CommandOutcome::SignedUp(self.sign_up(&user_name, &secret, &confirmation).await?),
            Command::LogIn { user_name, secret } => {
                CommandOutcome::LoggedIn(self.log_in(&user_name, &secret).await?)
            }
            Command::LogOut => {
                self.log_out().await?;
                CommandOutcome::LoggedOut
            }
            Command::SwitchMode(mode) => {
                self.switch_mode(mode);
                CommandOutcome::ModeSwitched(mode)
            }
            Command::AddUploadCandidates(candidates) => CommandOutcome::CandidatesAdded {
                total: self.add_upload_candidates(candidates)?,
            },
            Command::CommitUploads => CommandOutcome::Committed(self.commit_uploads().await?),
            Command::ListFiles => CommandOutcome::Files(self.list_files().await?),
            Command::SelectForDownload(id) => CommandOutcome::Selected {
                total: self.select_for_download(id).await?,
            },
            Command::RemoveEntry(index) => CommandOutcome::Removed(self.remove_entry(index)?),
            Command::DeleteAll => CommandOutcome::Cleared {
                removed: self.delete_all(),
            },
            Command::DeleteRecord(id) => {
                self.delete_record(id).await?;
                CommandOutcome::RecordDeleted(id)
            }
            Command::Export => CommandOutcome::Exported(self.export().await?),
        };
        Ok(outcome)
    }

    // Records owned by someone else are reported exactly like absent ones.
    async fn find_visible(&self, id: RecordId) -> DriveResult<FileRecord> {
        let identity = self
            .identity
            .as_ref()
            .ok_or(DriveError::AuthenticationRequired)?;

        self.store
            .find_by_id(id)
            .await?
            .filter(|record| is_visible_to(record, identity))
            .ok_or(DriveError::RecordNotFound(id))
    }

    fn require_mode(&self, mode: Mode) -> DriveResult<()> {
        if self.workspace.mode() != mode {
            return Err(DriveError::InvalidInput(format!(
                "Currently in {} mode; switch to {} mode first",
                self.workspace.mode(),
                mode
            )));
        }
        Ok(())
    }

    // Staged state never carries over between identities.
    fn set_identity(&mut self, identity: Option<Identity>) {
        if self.identity != identity {
            self.workspace.clear_all();
        }
        self.identity = identity;
    }
}
