//! Read-time ownership filter.
//!
//! The record store enforces nothing about ownership. Every read path that must
//! respect ownership goes through [`filter_visible`].

use crate::error::{DriveError, DriveResult};
use crate::models::{FileRecord, Identity};

/// A record is visible when it belongs to `identity` or carries no owner at all.
pub fn is_visible_to(record: &FileRecord, identity: &Identity) -> bool {
    record.is_unowned() || record.owner.as_deref() == Some(identity.as_str())
}

/// Keep the records visible to `identity`, preserving input order.
///
/// An absent identity is rejected instead of degrading to "unowned records only".
pub fn filter_visible(
    records: Vec<FileRecord>,
    identity: Option<&Identity>,
) -> DriveResult<Vec<FileRecord>> {
    let identity = identity.ok_or(DriveError::AuthenticationRequired)?;
    Ok(records
        .into_iter()
        .filter(|record| is_visible_to(record, identity))
        .collect())
}
