//! Patch sessions: backup gating, caching, and plan application

use bnk_rs::{
    AddOptions, BackupGate, BnkArchive, BnkEntry, BnkError, DirectoryBackup, EntryPath,
    EntrySource, PatchPlan, PatchSession, RemoveOptions, Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper: Write an archive holding the given raw entries
fn write_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let mut image = b"Wildfire\0\0\0\0\x01\0".to_vec();
    image.extend_from_slice(&0u32.to_le_bytes());

    let mut archive = BnkArchive::from_bytes(path, &image).unwrap();
    for (name, data) in entries {
        archive
            .add_entry(&BnkEntry::raw(name, data.to_vec()).unwrap(), AddOptions::default())
            .unwrap();
    }
    archive.save().unwrap();
}

/// Gate that records every request and answers with a fixed verdict
struct RecordingGate {
    allow: bool,
    requests: Vec<PathBuf>,
}

impl BackupGate for RecordingGate {
    fn ensure_backup(&mut self, path: &Path) -> Result<bool> {
        self.requests.push(path.to_path_buf());
        Ok(self.allow)
    }
}

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("SOURCE.BNK");
    let dest = dir.path().join("DEST.BNK");
    write_archive(&source, &[("GHOST.SPR", b"ghost"), ("TITLE.PAL", b"palette")]);
    write_archive(&dest, &[("OLD.SPR", b"old"), ("TITLE.PAL", b"stale")]);
    (dir, source, dest)
}

#[test]
fn test_add_from_archive_saves_destination() {
    let (dir, source, dest) = setup();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));

    session
        .add(
            &EntrySource::Archive(EntryPath::new(&source, "GHOST.SPR")),
            &EntryPath::new(&dest, "NEWGHOST.SPR"),
            AddOptions::default(),
        )
        .unwrap();

    let saved = BnkArchive::open(&dest).unwrap();
    assert_eq!(saved.get_entry("NEWGHOST.SPR").unwrap().data(), b"ghost");
    assert_eq!(saved.len(), 3);

    // Backup holds the pre-patch destination
    let backup = BnkArchive::open(dir.path().join("PatchBackups").join("DEST.BNK")).unwrap();
    assert_eq!(backup.len(), 2);
}

#[test]
fn test_replace_and_remove() {
    let (dir, source, dest) = setup();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));

    session
        .replace(
            &EntrySource::Archive(EntryPath::new(&source, "title.pal")),
            &EntryPath::new(&dest, "TITLE.PAL"),
        )
        .unwrap();
    session
        .remove(&EntryPath::new(&dest, "OLD.SPR"), RemoveOptions::default())
        .unwrap();

    let saved = BnkArchive::open(&dest).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.get_entry("TITLE.PAL").unwrap().data(), b"palette");
}

#[test]
fn test_literal_source() {
    let (dir, _source, dest) = setup();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));
    let literal = BnkEntry::raw("PATCH.DAT", vec![1, 2, 3]).unwrap();

    session
        .add(
            &EntrySource::Literal(literal),
            &EntryPath::new(&dest, "PATCH.DAT"),
            AddOptions::default(),
        )
        .unwrap();

    assert_eq!(
        BnkArchive::open(&dest).unwrap().get_entry("PATCH.DAT").unwrap().data(),
        &[1, 2, 3]
    );
}

#[test]
fn test_refused_backup_blocks_mutation() {
    let (_dir, source, dest) = setup();
    let before = fs::read(&dest).unwrap();
    let mut session = PatchSession::new(RecordingGate {
        allow: false,
        requests: Vec::new(),
    });

    match session.remove(&EntryPath::new(&dest, "OLD.SPR"), RemoveOptions::default()) {
        Err(BnkError::BackupUnavailable(_)) => {}
        other => panic!("Expected BackupUnavailable, got: {:?}", other),
    }
    assert!(session
        .add(
            &EntrySource::Archive(EntryPath::new(&source, "GHOST.SPR")),
            &EntryPath::new(&dest, "X"),
            AddOptions::default(),
        )
        .is_err());

    assert_eq!(fs::read(&dest).unwrap(), before);
    assert!(session.archive(&dest).is_none());
    assert_eq!(session.backup().requests, vec![dest.clone(), dest]);
}

#[test]
fn test_missing_destination_file_is_refused() {
    let dir = TempDir::new().unwrap();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));

    let result = session.remove(
        &EntryPath::new(dir.path().join("MISSING.BNK"), "X"),
        RemoveOptions::ignore_not_found(),
    );
    assert!(matches!(result, Err(BnkError::BackupUnavailable(_))));
}

#[test]
fn test_missing_source_entry() {
    let (dir, source, dest) = setup();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));

    let result = session.add(
        &EntrySource::Archive(EntryPath::new(&source, "NOPE.SPR")),
        &EntryPath::new(&dest, "NOPE.SPR"),
        AddOptions::default(),
    );
    assert!(matches!(result, Err(BnkError::EntryNotFound(_))));
}

#[test]
fn test_session_reuses_cached_archive() {
    let (dir, _source, dest) = setup();
    let mut session = PatchSession::new(DirectoryBackup::new(dir.path()));

    session
        .remove(&EntryPath::new(&dest, "OLD.SPR"), RemoveOptions::default())
        .unwrap();

    // An outside write is not seen: the session keeps its own copy
    write_archive(&dest, &[("OUTSIDE.SPR", b"x")]);
    session
        .remove(&EntryPath::new(&dest, "TITLE.PAL"), RemoveOptions::default())
        .unwrap();

    let saved = BnkArchive::open(&dest).unwrap();
    assert!(saved.is_empty());
    assert!(session.archive(&dest).unwrap().is_empty());
}

#[test]
fn test_failed_save_keeps_cache_in_step_with_disk() {
    let (_dir, _source, dest) = setup();
    let mut session = PatchSession::new(RecordingGate {
        allow: true,
        requests: Vec::new(),
    });

    session
        .remove(&EntryPath::new(&dest, "OLD.SPR"), RemoveOptions::default())
        .unwrap();

    // A directory in place of the archive makes the next save fail
    fs::remove_file(&dest).unwrap();
    fs::create_dir(&dest).unwrap();
    match session.remove(&EntryPath::new(&dest, "TITLE.PAL"), RemoveOptions::default()) {
        Err(BnkError::Io(_)) => {}
        other => panic!("Expected Io error, got: {:?}", other),
    }
    assert!(session.archive(&dest).unwrap().has_entry("TITLE.PAL"));

    // Once the path is writable again, the next step builds on the saved state
    fs::remove_dir(&dest).unwrap();
    session
        .add(
            &EntrySource::Literal(BnkEntry::raw("NEW.DAT", vec![1]).unwrap()),
            &EntryPath::new(&dest, "NEW.DAT"),
            AddOptions::default(),
        )
        .unwrap();

    let saved = BnkArchive::open(&dest).unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.has_entry("TITLE.PAL"));
    assert!(!saved.has_entry("OLD.SPR"));
}

#[test]
fn test_independent_sessions() {
    let (dir, _source, dest) = setup();

    let mut first = PatchSession::new(DirectoryBackup::new(dir.path()));
    first
        .remove(&EntryPath::new(&dest, "OLD.SPR"), RemoveOptions::default())
        .unwrap();

    let second = PatchSession::new(DirectoryBackup::new(dir.path()));
    assert!(second.archive(&dest).is_none());
    assert!(first.archive(&dest).is_some());
}

#[test]
fn test_apply_plan() {
    let (dir, _source, dest) = setup();
    let literal = BnkEntry::raw("INLINE.DAT", vec![4, 5, 6]).unwrap().wrap();
    let plan_text = format!(
        r#"
backup_dir = "Backups"

[[step]]
op = "add"
from = "SOURCE.BNK:GHOST.SPR"
to = "DEST.BNK:OLD.SPR"
force_replace = true

[[step]]
op = "add"
to = "DEST.BNK:INLINE.DAT"
entry = {}

[[step]]
op = "remove"
target = "DEST.BNK:TITLE.PAL"

[[step]]
op = "remove"
target = "DEST.BNK:NEVER.THERE"
ignore_not_found = true
"#,
        literal.to_literal()
    );
    let plan = PatchPlan::from_toml_str(&plan_text).unwrap();

    let mut session = PatchSession::new(plan.directory_backup(dir.path()));
    session.apply(&plan, dir.path()).unwrap();

    let saved = BnkArchive::open(&dest).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved.get_entry("OLD.SPR").unwrap().data(), b"ghost");
    assert_eq!(saved.get_entry("INLINE.DAT").unwrap().data(), &[4, 5, 6]);
    assert!(dir.path().join("Backups").join("DEST.BNK").exists());

    // Undo everything
    let restored = session.into_backup().restore_all().unwrap();
    assert_eq!(restored, vec![dest.clone()]);
    assert_eq!(BnkArchive::open(&dest).unwrap().get_entry("OLD.SPR").unwrap().data(), b"old");
}

#[test]
fn test_apply_plan_stops_at_first_failure() {
    let (dir, _source, dest) = setup();
    let plan = PatchPlan::from_toml_str(
        r#"
[[step]]
op = "remove"
target = "DEST.BNK:OLD.SPR"

[[step]]
op = "remove"
target = "DEST.BNK:MISSING.SPR"

[[step]]
op = "remove"
target = "DEST.BNK:TITLE.PAL"
"#,
    )
    .unwrap();

    let mut session = PatchSession::new(plan.directory_backup(dir.path()));
    assert!(matches!(
        session.apply(&plan, dir.path()),
        Err(BnkError::EntryNotFound(_))
    ));

    let saved = BnkArchive::open(&dest).unwrap();
    assert!(!saved.has_entry("OLD.SPR"));
    assert!(saved.has_entry("TITLE.PAL"));
}
