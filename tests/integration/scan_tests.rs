use rustdedup::actions::DeleteOutcome;
use rustdedup::duplicates::policy::{keep_shortest_path, prefer_roots};
use rustdedup::duplicates::DuplicateFinder;
use rustdedup::{deduplicate, DedupOptions, FileDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn by_name(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    x.base_name > y.base_name
}

#[test]
fn test_copy_in_second_root_is_deleted() {
    let base = tempdir().unwrap();
    let dir1 = base.path().join("dir1");
    let dir2 = base.path().join("dir2");
    let kept = write(&dir1, "fileA", b"same bytes");
    let copy = write(&dir2, "fileA", b"same bytes");
    let other = write(&dir2, "fileB", b"different!");

    let roots = vec![dir1.clone(), dir2.clone()];
    let records = deduplicate(&roots, prefer_roots(&roots), DedupOptions::default()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].deleted.display_path(), copy);
    assert_eq!(records[0].kept.display_path(), kept);
    assert_eq!(records[0].outcome, DeleteOutcome::Deleted);
    assert!(kept.exists());
    assert!(!copy.exists());
    assert!(other.exists());
}

#[test]
fn test_same_size_different_content_untouched() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"abcdef");
    let b = write(dir.path(), "b", b"fedcba");

    let records = deduplicate(
        &[dir.path().to_path_buf()],
        by_name,
        DedupOptions::default(),
    )
    .unwrap();

    assert!(records.is_empty());
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_checksum_collision_survives() {
    // "abc" and "b`d" share an Adler-32 checksum
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"abc");
    let b = write(dir.path(), "b", b"b`d");

    let finder = DuplicateFinder::new(DedupOptions::default(), by_name);
    let report = finder.run(&[dir.path().to_path_buf()]).unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.stats.candidate_groups, 1);
    assert_eq!(report.stats.verifications, 1);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_nested_duplicates_found() {
    let dir = tempdir().unwrap();
    let short = write(dir.path(), "x", b"nested content");
    let deep = write(dir.path(), "deep/er/still/x", b"nested content");

    let records = deduplicate(
        &[dir.path().to_path_buf()],
        keep_shortest_path,
        DedupOptions::default(),
    )
    .unwrap();

    assert_eq!(records.len(), 1);
    assert!(short.exists());
    assert!(!deep.exists());
}

#[test]
fn test_large_files_go_through_partial_checksum() {
    let dir = tempdir().unwrap();
    let mut head_differs = vec![7u8; 4096];
    head_differs[0] = 8;
    let mut tail_differs = vec![7u8; 4096];
    tail_differs[4095] = 8;
    write(dir.path(), "a", &vec![7u8; 4096]);
    let b = write(dir.path(), "b", &vec![7u8; 4096]);
    write(dir.path(), "c", &head_differs);
    write(dir.path(), "d", &tail_differs);

    let options = DedupOptions::default()
        .with_partial_hash_threshold(1024)
        .with_chunk_size(512);
    let report = DuplicateFinder::new(options, by_name)
        .run(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].deleted.real_path, fs::canonicalize(&b).unwrap());
    assert_eq!(report.stats.partial_hashed, 4);
    // "c" differs in the first chunk and never reaches the full checksum
    assert_eq!(report.stats.full_hashed, 3);
    assert_eq!(report.stats.bytes_reclaimed, 4096);
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"dup");
    let b = write(dir.path(), "b", b"dup");

    let options = DedupOptions::default().with_dry_run(true);
    let report = DuplicateFinder::new(options, by_name)
        .run(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].outcome, DeleteOutcome::DryRun);
    assert_eq!(report.stats.bytes_reclaimed, 3);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_size_filter_excludes_small_duplicates() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"tiny");
    let b = write(dir.path(), "b", b"tiny");

    let options = DedupOptions::default().with_size_range(Some(100), None);
    let records = deduplicate(&[dir.path().to_path_buf()], by_name, options).unwrap();

    assert!(records.is_empty());
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_three_copies_need_two_runs() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"triplet");
    let b = write(dir.path(), "b", b"triplet");
    let c = write(dir.path(), "c", b"triplet");
    let roots = [dir.path().to_path_buf()];

    let first = deduplicate(&roots, by_name, DedupOptions::default()).unwrap();
    assert_eq!(first.len(), 1);
    assert!(a.exists());
    assert_eq!(
        [b.exists(), c.exists()].iter().filter(|&&e| e).count(),
        1
    );

    let second = deduplicate(&roots, by_name, DedupOptions::default()).unwrap();
    assert_eq!(second.len(), 1);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(!c.exists());

    let third = deduplicate(&roots, by_name, DedupOptions::default()).unwrap();
    assert!(third.is_empty());
}
