//! Archive export of the download selection.

mod service;

pub use service::{ArchiveBlob, ArchiveCodec, ArchiveEntry, ArchiveExporter, ZipCodec};
