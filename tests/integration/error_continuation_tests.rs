use rustdedup::duplicates::DuplicateFinder;
use rustdedup::scanner::{Indexer, WalkerConfig};
use rustdedup::{DedupError, DedupOptions, FileDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn create(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn by_name(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    x.base_name > y.base_name
}

fn index(dir: &Path) -> Vec<FileDescriptor> {
    Indexer::new(WalkerConfig::default())
        .index(&[dir.to_path_buf()])
        .unwrap()
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let result = DuplicateFinder::new(DedupOptions::default(), by_name).run(&[missing]);
    assert!(matches!(result, Err(DedupError::NotFound(_))));
}

#[test]
fn test_file_root_is_an_error() {
    let dir = tempdir().unwrap();
    let file = create(dir.path(), "plain.txt", b"x");

    let result = DuplicateFinder::new(DedupOptions::default(), by_name).run(&[file]);
    assert!(matches!(result, Err(DedupError::NotADirectory(_))));
}

#[test]
fn test_vanished_file_aborts_by_default() {
    let dir = tempdir().unwrap();
    create(dir.path(), "a", b"pair");
    let gone = create(dir.path(), "b", b"pair");
    let files = index(dir.path());
    fs::remove_file(&gone).unwrap();

    let err = DuplicateFinder::new(DedupOptions::default(), by_name)
        .resolve(files)
        .unwrap_err();

    assert!(matches!(err, DedupError::NotFound(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_continue_on_error_skips_only_the_failing_group() {
    let dir = tempdir().unwrap();
    let a = create(dir.path(), "a", b"pair");
    let gone = create(dir.path(), "b", b"pair");
    let c = create(dir.path(), "c", b"second pair");
    let d = create(dir.path(), "d", b"second pair");
    let files = index(dir.path());
    fs::remove_file(&gone).unwrap();

    let options = DedupOptions::default().with_continue_on_error(true);
    let report = DuplicateFinder::new(options, by_name)
        .resolve(files)
        .unwrap();

    assert!(report.is_partial());
    assert_eq!(report.errors.len(), 1);
    let resolved_gone = fs::canonicalize(dir.path()).unwrap().join("b");
    assert_eq!(report.errors[0].path(), Some(resolved_gone.as_path()));
    assert_eq!(report.stats.size_groups, 2);
    assert_eq!(report.stats.groups_failed, 1);
    assert_eq!(report.records.len(), 1);
    assert!(a.exists());
    assert!(c.exists());
    assert!(!d.exists());
}

#[test]
fn test_interrupt_stops_before_any_deletion() {
    let dir = tempdir().unwrap();
    let a = create(dir.path(), "a", b"dup");
    let b = create(dir.path(), "b", b"dup");

    let options = DedupOptions::default()
        .with_continue_on_error(true)
        .with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let result = DuplicateFinder::new(options, by_name).run(&[dir.path().to_path_buf()]);

    assert!(matches!(result, Err(DedupError::Interrupted)));
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_fatal_errors_classified() {
    assert!(DedupError::Interrupted.is_fatal());
    assert!(DedupError::InvariantViolation {
        deleted: PathBuf::from("/a"),
        kept: PathBuf::from("/b"),
    }
    .is_fatal());
    assert!(!DedupError::NotFound(PathBuf::from("/a")).is_fatal());
}
