#![cfg(unix)]

use rustdedup::actions::{DeleteOutcome, ReplaceWith};
use rustdedup::duplicates::DuplicateFinder;
use rustdedup::{DedupOptions, FileDescriptor};
use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn create(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

/// Delete later names in favor of earlier ones.
fn by_name(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    x.base_name > y.base_name
}

fn run(dir: &Path, options: DedupOptions) -> rustdedup::DedupReport {
    DuplicateFinder::new(options, by_name)
        .run(&[dir.to_path_buf()])
        .unwrap()
}

#[test]
fn test_hardlinks_retained_by_default() {
    let dir = tempdir().unwrap();
    let original = create(dir.path(), "a.txt", b"linked content");
    let link = dir.path().join("b.txt");
    fs::hard_link(&original, &link).unwrap();

    let report = run(dir.path(), DedupOptions::default());

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].outcome, DeleteOutcome::HardlinkRetained);
    assert_eq!(report.stats.bytes_reclaimed, 0);
    assert!(original.exists());
    assert!(link.exists());
}

#[test]
fn test_delete_hardlinks_removes_link() {
    let dir = tempdir().unwrap();
    let original = create(dir.path(), "a.txt", b"linked content");
    let link = dir.path().join("b.txt");
    fs::hard_link(&original, &link).unwrap();

    let report = run(dir.path(), DedupOptions::default().with_delete_hardlinks(true));

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].outcome, DeleteOutcome::Deleted);
    assert!(!link.exists());
    assert_eq!(fs::metadata(&original).unwrap().nlink(), 1);
}

#[test]
fn test_hardlink_not_replaced_by_hardlink() {
    let dir = tempdir().unwrap();
    let original = create(dir.path(), "a.txt", b"linked content");
    let link = dir.path().join("b.txt");
    fs::hard_link(&original, &link).unwrap();

    let options = DedupOptions::default()
        .with_delete_hardlinks(true)
        .with_replace_with(ReplaceWith::Hardlink);
    let report = run(dir.path(), options);

    assert_eq!(report.records[0].outcome, DeleteOutcome::HardlinkRetained);
    assert_eq!(fs::metadata(&original).unwrap().nlink(), 2);
}

#[test]
fn test_replace_with_symlink() {
    let dir = tempdir().unwrap();
    let keep = create(dir.path(), "a.txt", b"copy me");
    let copy = create(dir.path(), "b.txt", b"copy me");

    let report = run(
        dir.path(),
        DedupOptions::default().with_replace_with(ReplaceWith::Symlink),
    );

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].outcome, DeleteOutcome::ReplacedWithSymlink);
    assert!(fs::symlink_metadata(&copy).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_link(&copy).unwrap(),
        fs::canonicalize(&keep).unwrap()
    );
    assert_eq!(fs::read(&copy).unwrap(), b"copy me");
}

#[test]
fn test_replace_with_hardlink() {
    let dir = tempdir().unwrap();
    let keep = create(dir.path(), "a.txt", b"copy me");
    let copy = create(dir.path(), "b.txt", b"copy me");

    let report = run(
        dir.path(),
        DedupOptions::default().with_replace_with(ReplaceWith::Hardlink),
    );

    assert_eq!(report.records[0].outcome, DeleteOutcome::ReplacedWithHardlink);
    assert_eq!(
        fs::metadata(&copy).unwrap().ino(),
        fs::metadata(&keep).unwrap().ino()
    );
}

#[test]
fn test_symlinked_files_never_indexed() {
    let dir = tempdir().unwrap();
    let original = create(dir.path(), "a.txt", b"target");
    let link = dir.path().join("b.txt");
    std::os::unix::fs::symlink(&original, &link).unwrap();

    let report = run(dir.path(), DedupOptions::default());

    assert_eq!(report.stats.files_indexed, 1);
    assert!(report.records.is_empty());
    assert!(original.exists());
    assert!(fs::symlink_metadata(&link).is_ok());
}

#[test]
fn test_symlink_replacement_is_stable_on_rerun() {
    let dir = tempdir().unwrap();
    let keep = create(dir.path(), "a.txt", b"copy me");
    create(dir.path(), "b.txt", b"copy me");
    let options = DedupOptions::default().with_replace_with(ReplaceWith::Symlink);

    assert_eq!(run(dir.path(), options.clone()).records.len(), 1);
    assert!(run(dir.path(), options).records.is_empty());
    assert!(keep.exists());
}
