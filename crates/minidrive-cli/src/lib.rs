//! Host-side helpers for the `minidrive` binary: file collection, shell parsing
//! and output formatting.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use minidrive_core::{RecordId, UploadCandidate};
use minidrive_services::{Command, Mode};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for the CLI. `RUST_LOG` overrides the default filter.
///
/// Production builds log JSON lines; everything else gets the compact text format.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("minidrive=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Best-effort MIME type from the file extension. Unknown extensions map to "".
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "",
    }
}

/// Expand `paths` into upload candidates.
///
/// Directories are walked recursively in name order. Each candidate is named by
/// its file name only; the directory structure is not kept.
pub async fn collect_upload_candidates(paths: &[PathBuf]) -> Result<Vec<UploadCandidate>> {
    let mut candidates = Vec::new();

    for root in paths {
        let mut pending = vec![root.clone()];
        while let Some(path) = pending.pop() {
            let metadata = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;

            if metadata.is_dir() {
                let mut entries = tokio::fs::read_dir(&path)
                    .await
                    .with_context(|| format!("Failed to list {}", path.display()))?;
                let mut children = Vec::new();
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .with_context(|| format!("Failed to list {}", path.display()))?
                {
                    children.push(entry.path());
                }
                children.sort();
                // Stack pops from the back.
                pending.extend(children.into_iter().rev());
            } else if metadata.is_file() {
                candidates.push(read_candidate(&path, &metadata).await?);
            } else {
                tracing::debug!(path = %path.display(), "Skipping non-regular file");
            }
        }
    }

    Ok(candidates)
}

async fn read_candidate(path: &Path, metadata: &Metadata) -> Result<UploadCandidate> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("No file name in {}", path.display()))?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(UploadCandidate::new(
        name,
        mime_type_for(path),
        data,
        last_modified,
    ))
}

/// One line of shell input.
#[derive(Debug)]
pub enum ShellInput {
    Command(Command),
    /// Files to collect and stage before dispatching.
    Stage(Vec<PathBuf>),
    Status,
    Help,
    Quit,
}

pub const SHELL_HELP: &str = "\
Commands:
  mode upload|download   switch mode (clears both lists)
  add <path>...          stage files or folders for upload
  commit                 upload staged files
  list                   list your files
  select <id>            add a file to the download selection
  remove <index>         remove one entry from the active list
  clear                  empty the active list
  delete <id>            permanently delete a file
  export                 write the selection to a ZIP archive
  status                 show the active list
  help | quit";

/// Parse one shell line. Blank lines yield `None`.
pub fn parse_shell_line(line: &str) -> Result<Option<ShellInput>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let input = match verb.to_lowercase().as_str() {
        "mode" => {
            let mode: Mode = single_arg(verb, &args)?.parse()?;
            ShellInput::Command(Command::SwitchMode(mode))
        }
        "add" => {
            if args.is_empty() {
                anyhow::bail!("Usage: add <path>...");
            }
            ShellInput::Stage(args.iter().map(PathBuf::from).collect())
        }
        "commit" => ShellInput::Command(Command::CommitUploads),
        "list" | "ls" => ShellInput::Command(Command::ListFiles),
        "select" => ShellInput::Command(Command::SelectForDownload(record_id_arg(verb, &args)?)),
        "remove" | "rm" => {
            let index = single_arg(verb, &args)?
                .parse::<usize>()
                .context("Index must be a non-negative number")?;
            ShellInput::Command(Command::RemoveEntry(index))
        }
        "clear" => ShellInput::Command(Command::DeleteAll),
        "delete" => ShellInput::Command(Command::DeleteRecord(record_id_arg(verb, &args)?)),
        "export" => ShellInput::Command(Command::Export),
        "status" => ShellInput::Status,
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        other => anyhow::bail!("Unknown command '{}'. Type 'help' for a list.", other),
    };

    Ok(Some(input))
}

fn single_arg<'a>(verb: &str, args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(*arg),
        _ => anyhow::bail!("'{}' takes exactly one argument", verb),
    }
}

fn record_id_arg(verb: &str, args: &[&str]) -> Result<RecordId> {
    single_arg(verb, args)?
        .parse::<RecordId>()
        .context("File id must be a number")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_exact() {
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("résumé-final.pdf", 9), "résumé...");
    }

    #[test]
    fn mime_type_lookup() {
        assert_eq!(mime_type_for(Path::new("notes.TXT")), "text/plain");
        assert_eq!(mime_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("Makefile")), "");
    }

    #[tokio::test]
    async fn collect_walks_folders_and_drops_paths() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("docs").join("deep");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("docs").join("a.md"), b"# a").unwrap();
        std::fs::write(nested.join("c.png"), b"png").unwrap();

        let candidates = collect_upload_candidates(&[dir.path().to_path_buf()])
            .await
            .unwrap();

        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b.txt", "a.md", "c.png"]);
        assert_eq!(candidates[1].mime_type, "text/markdown");
        assert_eq!(candidates[2].size_bytes, 3);
        assert_eq!(candidates[2].data, b"png");
    }

    #[tokio::test]
    async fn collect_missing_path_fails() {
        let dir = tempdir().unwrap();
        let result = collect_upload_candidates(&[dir.path().join("nope.txt")]).await;
        assert!(result.is_err());
    }

    #[test]
    fn parse_shell_commands() {
        assert!(parse_shell_line("   ").unwrap().is_none());
        assert!(matches!(
            parse_shell_line("mode download").unwrap(),
            Some(ShellInput::Command(Command::SwitchMode(Mode::Download)))
        ));
        assert!(matches!(
            parse_shell_line("select 42").unwrap(),
            Some(ShellInput::Command(Command::SelectForDownload(42)))
        ));
        assert!(matches!(
            parse_shell_line("rm 0").unwrap(),
            Some(ShellInput::Command(Command::RemoveEntry(0)))
        ));
        assert!(matches!(
            parse_shell_line("add a.txt photos").unwrap(),
            Some(ShellInput::Stage(paths)) if paths.len() == 2
        ));
        assert!(matches!(parse_shell_line("quit").unwrap(), Some(ShellInput::Quit)));
    }

    #[test]
    fn parse_shell_rejects_bad_input() {
        assert!(parse_shell_line("select").is_err());
        assert!(parse_shell_line("select abc").is_err());
        assert!(parse_shell_line("remove -1").is_err());
        assert!(parse_shell_line("mode sideways").is_err());
        assert!(parse_shell_line("frobnicate").is_err());
    }
}
