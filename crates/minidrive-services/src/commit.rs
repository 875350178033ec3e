//! Commit pipeline: moves upload candidates into the record store.

use minidrive_core::{DriveError, DriveResult, Identity, RecordId, UploadCandidate};
use minidrive_db::RecordStore;
use std::time::Instant;

/// The candidate that stopped a commit.
#[derive(Debug)]
pub struct CommitFailure {
    /// Zero-based index into the candidate list.
    pub index: usize,
    pub name: String,
    pub error: DriveError,
}

impl CommitFailure {
    /// One-based position, as shown to users ("file 2 of 3").
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

/// Outcome of one commit run.
///
/// `committed` holds the ids of the successful prefix in candidate order. When
/// `failure` is set, the `not_attempted` candidates after it were never sent to
/// the store.
#[derive(Debug)]
pub struct CommitReport {
    pub committed: Vec<RecordId>,
    pub failure: Option<CommitFailure>,
    pub not_attempted: usize,
}

impl CommitReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Number of candidates that reached the store, including the failing one.
    pub fn attempted(&self) -> usize {
        self.committed.len() + usize::from(self.failure.is_some())
    }
}

/// Commit `candidates` in order, one `add` at a time, tagging each with `identity`.
///
/// Each add is awaited before the next starts so a failure always leaves a
/// contiguous committed prefix. The first failure stops the run.
#[tracing::instrument(skip_all, fields(candidates = candidates.len()))]
pub async fn commit<S>(
    store: &S,
    candidates: &[UploadCandidate],
    identity: Option<&Identity>,
) -> DriveResult<CommitReport>
where
    S: RecordStore + ?Sized,
{
    let identity = identity.ok_or(DriveError::AuthenticationRequired)?;
    if candidates.is_empty() {
        return Err(DriveError::EmptySelection);
    }

    let start = Instant::now();
    let mut committed = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        match store.add(candidate.as_new_record(), Some(identity)).await {
            Ok(id) => committed.push(id),
            Err(error) => {
                let not_attempted = candidates.len() - index - 1;
                tracing::warn!(
                    owner = %identity,
                    index,
                    name = %candidate.name,
                    committed = committed.len(),
                    not_attempted,
                    error = %error,
                    "Commit stopped at failing candidate"
                );
                return Ok(CommitReport {
                    committed,
                    failure: Some(CommitFailure {
                        index,
                        name: candidate.name.clone(),
                        error,
                    }),
                    not_attempted,
                });
            }
        }
    }

    tracing::info!(
        owner = %identity,
        committed = committed.len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Upload batch committed"
    );

    Ok(CommitReport {
        committed,
        failure: None,
        not_attempted: 0,
    })
}
