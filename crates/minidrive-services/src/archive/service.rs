use anyhow::{Context, Result};
use minidrive_core::{DriveError, DriveResult, FileRecord, RecordId};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

/// One file registered with a codec.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Compression codec that turns a list of entries into one container blob.
///
/// Implementations must either return the complete blob or an error; no partial
/// output is ever handed back.
pub trait ArchiveCodec: Send + Sync {
    fn encode(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>>;
}

/// ZIP container, deflate compression, no directory entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ArchiveCodec for ZipCodec {
    fn encode(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
        use zip::write::{FileOptions, ZipWriter};
        use zip::CompressionMethod;

        let mut buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
            let options = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);

            // Colliding names are written as separate entries.
            for entry in entries {
                zip.start_file(entry.name.as_str(), options)
                    .with_context(|| format!("Failed to add file to ZIP: {}", entry.name))?;
                zip.write_all(&entry.data)
                    .with_context(|| format!("Failed to write file data to ZIP: {}", entry.name))?;
            }

            zip.finish().context("Failed to finalize ZIP archive")?;
        }

        Ok(buffer)
    }
}

/// A finished archive ready to be handed to the host.
#[derive(Debug, Clone)]
pub struct ArchiveBlob {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entry_count: usize,
}

/// Builds archives from the download selection.
#[derive(Clone)]
pub struct ArchiveExporter {
    codec: Arc<dyn ArchiveCodec>,
    archive_name: String,
}

impl ArchiveExporter {
    pub fn new(archive_name: impl Into<String>) -> Self {
        Self::with_codec(Arc::new(ZipCodec), archive_name)
    }

    pub fn with_codec(codec: Arc<dyn ArchiveCodec>, archive_name: impl Into<String>) -> Self {
        Self {
            codec,
            archive_name: archive_name.into(),
        }
    }

    /// Pack every selected record into one archive, in selection order.
    ///
    /// Encoding runs on the blocking pool. Any codec error becomes
    /// [`DriveError::ArchiveGenerationFailed`].
    #[tracing::instrument(skip_all, fields(entries = selection.len()))]
    pub async fn export(&self, selection: &[FileRecord]) -> DriveResult<ArchiveBlob> {
        if selection.is_empty() {
            return Err(DriveError::EmptySelection);
        }

        let start = Instant::now();
        let entries: Vec<ArchiveEntry> = selection
            .iter()
            .map(|record| ArchiveEntry {
                name: entry_name(&record.name, record.id),
                data: record.raw_data.clone(),
            })
            .collect();
        let entry_count = entries.len();

        let codec = Arc::clone(&self.codec);
        let bytes = tokio::task::spawn_blocking(move || codec.encode(&entries))
            .await
            .map_err(|e| DriveError::ArchiveGenerationFailed(e.to_string()))?
            .map_err(|e| {
                tracing::error!(error = %e, "Archive encoding failed");
                DriveError::ArchiveGenerationFailed(format!("{:#}", e))
            })?;

        tracing::info!(
            entry_count,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Archive generated"
        );

        Ok(ArchiveBlob {
            file_name: self.archive_name.clone(),
            bytes,
            entry_count,
        })
    }
}

/// Flat entry name for a record. Separators become `_` so every entry sits at the
/// archive root under a name that still reads like the stored one.
fn entry_name(name: &str, id: RecordId) -> String {
    let is_separator = |c: char| c == '/' || c == '\\';

    if name.is_empty() || name == "." || name == ".." || name.chars().all(is_separator) {
        return format!("unnamed_{}", id);
    }

    name.chars()
        .map(|c| if is_separator(c) { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::{Cursor, Read};

    fn record(id: RecordId, name: &str, data: &[u8]) -> FileRecord {
        FileRecord {
            id,
            name: name.to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: data.len() as i64,
            raw_data: data.to_vec(),
            last_modified: Utc::now(),
            created_at: Utc::now(),
            owner: Some("alice".to_string()),
        }
    }

    struct BrokenCodec;

    impl ArchiveCodec for BrokenCodec {
        fn encode(&self, _entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
            Err(anyhow::anyhow!("disk full"))
        }
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("document.pdf", 1), "document.pdf");
        assert_eq!(entry_name("docs/report.txt", 1), "docs_report.txt");
        assert_eq!(entry_name("a\\b.txt", 1), "a_b.txt");
        assert_eq!(entry_name("../../etc/passwd", 1), ".._.._etc_passwd");
        assert_eq!(entry_name("", 42), "unnamed_42");
        assert_eq!(entry_name("..", 7), "unnamed_7");
        assert_eq!(entry_name("//", 8), "unnamed_8");
        assert_eq!(entry_name("__init__.py", 9), "__init__.py");
    }

    #[tokio::test]
    async fn test_export_empty_selection() {
        let exporter = ArchiveExporter::new("minidrive_files.zip");
        assert!(matches!(
            exporter.export(&[]).await,
            Err(DriveError::EmptySelection)
        ));
    }

    #[tokio::test]
    async fn test_export_writes_one_entry_per_record() {
        let exporter = ArchiveExporter::new("minidrive_files.zip");
        let selection = [record(1, "a.txt", b"alpha"), record(2, "b.txt", b"beta")];

        let blob = exporter.export(&selection).await.unwrap();
        assert_eq!(blob.file_name, "minidrive_files.zip");
        assert_eq!(blob.entry_count, 2);

        let mut archive = zip::ZipArchive::new(Cursor::new(blob.bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "a.txt");
        first.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "alpha");
    }

    #[tokio::test]
    async fn test_codec_failure_surfaces_as_generation_failed() {
        let exporter = ArchiveExporter::with_codec(Arc::new(BrokenCodec), "out.zip");
        let result = exporter.export(&[record(1, "a.txt", b"x")]).await;

        match result {
            Err(DriveError::ArchiveGenerationFailed(message)) => {
                assert!(message.contains("disk full"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
