//! MiniDrive CLI: a local, owner-partitioned file store.
//!
//! Configuration comes from the environment (see `DriveConfig::from_env`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use minidrive_cli::{
    collect_upload_candidates, init_tracing, parse_shell_line, truncate_string, ShellInput,
    SHELL_HELP,
};
use minidrive_core::{
    format_size, DriveConfig, DriveError, ErrorMetadata, FileRecord, LogLevel, RecordId,
};
use minidrive_db::{DatabaseHandle, SqliteRecordStore, UserRepository};
use minidrive_services::{
    ArchiveBlob, ArchiveExporter, Command, CommandOutcome, CommitReport, DriveSession,
    LocalAuthOracle, Mode,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "minidrive", about = "MiniDrive local file store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        user_name: String,
        #[arg(long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm: String,
    },
    /// Sign in; later commands act as this user
    Login {
        user_name: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Upload files or folders (folders are walked recursively)
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List your files
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete one of your files
    Delete { id: RecordId },
    /// Download files as a ZIP archive
    Export {
        #[arg(required = true)]
        ids: Vec<RecordId>,
        /// Output path (defaults to the configured archive name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Interactive session with upload and download lists
    Shell,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn report_error(err: &DriveError) {
    match err.log_level() {
        LogLevel::Error => {
            tracing::error!(code = err.error_code(), error = %err, "Command failed")
        }
        LogLevel::Warn => tracing::warn!(code = err.error_code(), error = %err, "Command failed"),
        LogLevel::Debug => {
            tracing::debug!(code = err.error_code(), error = %err, "Command failed")
        }
    }

    eprintln!("Error: {}", err.client_message());
    if let Some(action) = err.suggested_action() {
        eprintln!("  {}", action);
    }
}

fn print_files(records: &[FileRecord]) {
    if records.is_empty() {
        println!("No files.");
        return;
    }

    println!("{:>8} {:<40} {:>10} {:<20}", "ID", "Name", "Size", "Modified");
    println!("{}", "-".repeat(81));
    for record in records {
        println!(
            "{:>8} {:<40} {:>10} {:<20}",
            record.id,
            truncate_string(&record.name, 40),
            format_size(record.size_bytes),
            record.last_modified.format("%Y-%m-%d %H:%M:%S"),
        );
    }
}

fn print_commit_report(report: &CommitReport) {
    match &report.failure {
        None => println!("Uploaded {} file(s).", report.committed.len()),
        Some(failure) => {
            println!(
                "Uploaded {} file(s) before '{}' (file {}) failed: {}",
                report.committed.len(),
                failure.name,
                failure.position(),
                failure.error.client_message()
            );
            if report.not_attempted > 0 {
                println!("{} file(s) were not attempted.", report.not_attempted);
            }
        }
    }
}

async fn write_archive(blob: &ArchiveBlob, out: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = out.unwrap_or_else(|| PathBuf::from(&blob.file_name));
    tokio::fs::write(&path, &blob.bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} file(s) to {} ({})",
        blob.entry_count,
        path.display(),
        format_size(i64::try_from(blob.bytes.len()).unwrap_or(i64::MAX))
    );
    Ok(path)
}

fn print_status(session: &DriveSession) {
    let workspace = session.workspace();
    match session.identity() {
        Some(identity) => println!("Signed in as {}, {} mode", identity, workspace.mode()),
        None => println!("Not signed in, {} mode", workspace.mode()),
    }

    match workspace.mode() {
        Mode::Upload => {
            for (index, candidate) in workspace.upload_candidates().iter().enumerate() {
                println!(
                    "  [{}] {} ({})",
                    index,
                    candidate.name,
                    format_size(candidate.size_bytes)
                );
            }
        }
        Mode::Download => {
            for (index, record) in workspace.download_selection().iter().enumerate() {
                println!(
                    "  [{}] #{} {} ({})",
                    index,
                    record.id,
                    record.name,
                    format_size(record.size_bytes)
                );
            }
        }
    }
}

async fn print_outcome(outcome: CommandOutcome) -> anyhow::Result<()> {
    match outcome {
        CommandOutcome::SignedUp(account) => println!("Created user {}", account.user_name),
        CommandOutcome::LoggedIn(identity) => println!("Signed in as {}", identity),
        CommandOutcome::LoggedOut => println!("Signed out"),
        CommandOutcome::ModeSwitched(mode) => println!("Switched to {} mode", mode),
        CommandOutcome::CandidatesAdded { total } => println!("{} file(s) staged", total),
        CommandOutcome::Committed(report) => print_commit_report(&report),
        CommandOutcome::Files(records) => print_files(&records),
        CommandOutcome::Selected { total } => println!("{} file(s) selected", total),
        CommandOutcome::Removed(entry) => println!("Removed {}", entry.name()),
        CommandOutcome::Cleared { removed } => println!("Removed {} entries", removed),
        CommandOutcome::RecordDeleted(id) => println!("Deleted file {}", id),
        CommandOutcome::Exported(blob) => {
            write_archive(&blob, None).await?;
        }
    }
    Ok(())
}

async fn run_shell(session: &mut DriveSession) -> anyhow::Result<()> {
    println!("{}", SHELL_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("minidrive ({})> ", session.workspace().mode());
        std::io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        let input = match parse_shell_line(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{:#}", e);
                continue;
            }
        };

        let command = match input {
            ShellInput::Quit => break,
            ShellInput::Help => {
                println!("{}", SHELL_HELP);
                continue;
            }
            ShellInput::Status => {
                print_status(session);
                continue;
            }
            ShellInput::Stage(paths) => match collect_upload_candidates(&paths).await {
                Ok(candidates) => Command::AddUploadCandidates(candidates),
                Err(e) => {
                    eprintln!("{:#}", e);
                    continue;
                }
            },
            ShellInput::Command(command) => command,
        };

        match session.execute(command).await {
            Ok(outcome) => {
                if let Err(e) = print_outcome(outcome).await {
                    eprintln!("{:#}", e);
                }
            }
            Err(err) => report_error(&err),
        }
    }

    Ok(())
}

async fn run(cli: Cli, session: &mut DriveSession) -> Result<(), DriveError> {
    match cli.command {
        Commands::Signup {
            user_name,
            password,
            confirm,
        } => {
            let account = session.sign_up(&user_name, &password, &confirm).await?;
            println!("Created user {}", account.user_name);
        }
        Commands::Login {
            user_name,
            password,
        } => {
            let identity = session.log_in(&user_name, &password).await?;
            println!("Signed in as {}", identity);
        }
        Commands::Logout => {
            session.log_out().await?;
            println!("Signed out");
        }
        Commands::Whoami => match session.identity() {
            Some(identity) => println!("{}", identity),
            None => println!("Not signed in"),
        },
        Commands::Upload { paths } => {
            let candidates = collect_upload_candidates(&paths)
                .await
                .map_err(|e| DriveError::InvalidInput(format!("{:#}", e)))?;
            session.add_upload_candidates(candidates)?;
            let report = session.commit_uploads().await?;
            print_commit_report(&report);
            if let Some(failure) = report.failure {
                return Err(failure.error);
            }
        }
        Commands::List { json } => {
            let records = session.list_files().await?;
            if json {
                print_json(&records).map_err(|e| DriveError::Internal(e.to_string()))?;
            } else {
                print_files(&records);
            }
        }
        Commands::Delete { id } => {
            session.delete_record(id).await?;
            println!("Deleted file {}", id);
        }
        Commands::Export { ids, out } => {
            session.switch_mode(Mode::Download);
            for id in ids {
                session.select_for_download(id).await?;
            }
            let blob = session.export().await?;
            write_archive(&blob, out)
                .await
                .map_err(|e| DriveError::Internal(format!("{:#}", e)))?;
        }
        Commands::Shell => {
            run_shell(session)
                .await
                .map_err(|e| DriveError::Internal(format!("{:#}", e)))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = DriveConfig::from_env().context("Invalid MiniDrive configuration")?;
    init_tracing(config.is_production());

    let handle = Arc::new(DatabaseHandle::new(&config));
    handle
        .open()
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    let mut session = DriveSession::new(
        Arc::new(SqliteRecordStore::new(handle.clone())),
        Arc::new(LocalAuthOracle::new(UserRepository::new(handle))),
        ArchiveExporter::new(config.archive_name.clone()),
        config.max_file_size_bytes,
    );
    session.restore().await.context("Failed to load the signed-in user")?;

    if let Err(err) = run(cli, &mut session).await {
        report_error(&err);
        std::process::exit(if err.is_user_correctable() { 2 } else { 1 });
    }

    Ok(())
}
