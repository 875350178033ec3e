mod helpers;

use helpers::auth::sign_in_as;
use helpers::fixtures::candidate;
use helpers::setup_test_drive;
use minidrive_core::DriveError;
use minidrive_services::{Command, CommandOutcome, DriveSession, Mode};
use std::io::{Cursor, Read};

fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).expect("Export should be a valid ZIP");
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), data)
        })
        .collect()
}

/// Commit `files` as the signed-in user and switch the session to download mode.
async fn commit_and_switch(session: &mut DriveSession, files: &[(&str, &[u8])]) -> Vec<i64> {
    let candidates = files.iter().map(|(name, data)| candidate(name, data)).collect();
    session.add_upload_candidates(candidates).unwrap();
    let report = session.commit_uploads().await.unwrap();
    assert!(report.is_complete());
    session.switch_mode(Mode::Download);
    report.committed
}

#[tokio::test]
async fn test_export_contains_each_selected_record() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();
    sign_in_as(&mut session, "alice").await;

    let files: [(&str, &[u8]); 2] = [("x.txt", b"hi"), ("y.txt", b"yo")];
    let ids = commit_and_switch(&mut session, &files).await;
    for id in &ids {
        session.select_for_download(*id).await.unwrap();
    }

    let blob = session.export().await.unwrap();
    assert_eq!(blob.file_name, "minidrive_files.zip");
    assert_eq!(blob.entry_count, 2);

    let entries = read_entries(blob.bytes);
    assert_eq!(
        entries,
        vec![
            ("x.txt".to_string(), b"hi".to_vec()),
            ("y.txt".to_string(), b"yo".to_vec()),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_selection_exports_twice() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();
    sign_in_as(&mut session, "alice").await;

    let ids = commit_and_switch(&mut session, &[("same.txt", &b"dup"[..])]).await;
    session.select_for_download(ids[0]).await.unwrap();
    let total = session.select_for_download(ids[0]).await.unwrap();
    assert_eq!(total, 2);

    let blob = session.export().await.unwrap();
    let entries = read_entries(blob.bytes);
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|(name, data)| name == "same.txt" && data == b"dup"));
}

#[tokio::test]
async fn test_export_entry_count_matches_selection() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();
    sign_in_as(&mut session, "alice").await;

    let files: Vec<(String, Vec<u8>)> = (0..5)
        .map(|i| (format!("file{}.bin", i), vec![i as u8; 2048 * (i + 1)]))
        .collect();
    let borrowed: Vec<(&str, &[u8])> = files
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    let ids = commit_and_switch(&mut session, &borrowed).await;

    // Selection order differs from commit order and repeats one record.
    let picks = [ids[3], ids[0], ids[3], ids[4]];
    for id in picks {
        session.select_for_download(id).await.unwrap();
    }

    let selection = session.workspace().download_selection().to_vec();
    let blob = session.export().await.unwrap();
    let entries = read_entries(blob.bytes);

    assert_eq!(entries.len(), selection.len());
    for ((name, data), record) in entries.iter().zip(&selection) {
        assert_eq!(name, &record.name);
        assert_eq!(data, &record.raw_data);
    }
}

#[tokio::test]
async fn test_export_empty_selection_fails() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();
    sign_in_as(&mut session, "alice").await;

    assert!(matches!(
        session.export().await,
        Err(DriveError::EmptySelection)
    ));
}

#[tokio::test]
async fn test_selection_outlives_deleted_record() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();
    sign_in_as(&mut session, "alice").await;

    let ids = commit_and_switch(&mut session, &[("gone.txt", &b"still here"[..])]).await;
    session.select_for_download(ids[0]).await.unwrap();
    session.delete_record(ids[0]).await.unwrap();

    assert!(session.list_files().await.unwrap().is_empty());
    let entries = read_entries(session.export().await.unwrap().bytes);
    assert_eq!(entries, vec![("gone.txt".to_string(), b"still here".to_vec())]);
}

#[tokio::test]
async fn test_command_dispatch_round() {
    let drive = setup_test_drive().await;
    let mut session = drive.session();

    session
        .execute(Command::SignUp {
            user_name: "carol".to_string(),
            secret: "pw".to_string(),
            confirmation: "pw".to_string(),
        })
        .await
        .unwrap();
    let outcome = session
        .execute(Command::LogIn {
            user_name: "carol".to_string(),
            secret: "pw".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(outcome, CommandOutcome::LoggedIn(ref id) if id.as_str() == "carol"));

    session
        .execute(Command::AddUploadCandidates(vec![
            candidate("a.txt", b"a"),
            candidate("b.txt", b"b"),
        ]))
        .await
        .unwrap();
    let outcome = session.execute(Command::RemoveEntry(0)).await.unwrap();
    assert!(matches!(outcome, CommandOutcome::Removed(ref entry) if entry.name() == "a.txt"));

    let outcome = session.execute(Command::CommitUploads).await.unwrap();
    let id = match outcome {
        CommandOutcome::Committed(report) => report.committed[0],
        other => panic!("unexpected outcome: {:?}", other),
    };

    session.execute(Command::SwitchMode(Mode::Download)).await.unwrap();
    session.execute(Command::SelectForDownload(id)).await.unwrap();
    let outcome = session.execute(Command::Export).await.unwrap();
    assert!(matches!(outcome, CommandOutcome::Exported(ref blob) if blob.entry_count == 1));

    let outcome = session.execute(Command::DeleteAll).await.unwrap();
    assert!(matches!(outcome, CommandOutcome::Cleared { removed: 1 }));
    assert!(matches!(
        session.execute(Command::RemoveEntry(0)).await,
        Err(DriveError::IndexOutOfRange { index: 0, len: 0 })
    ));
}
