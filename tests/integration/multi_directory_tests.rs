use rustdedup::duplicates::policy::prefer_roots;
use rustdedup::duplicates::DuplicateFinder;
use rustdedup::scanner::{Indexer, WalkerConfig};
use rustdedup::{DedupOptions, FileDescriptor};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn create(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
fn test_two_non_overlapping_directories() {
    let base = tempdir().unwrap();
    let photos = base.path().join("photos");
    let backup = base.path().join("backup");
    let original = create(&photos, "img.raw", b"pixels");
    let copy = create(&backup, "img-copy.raw", b"pixels");

    let roots = vec![photos, backup];
    let report = DuplicateFinder::new(DedupOptions::default(), prefer_roots(&roots))
        .run(&roots)
        .unwrap();

    assert_eq!(report.stats.files_indexed, 2);
    assert_eq!(report.records.len(), 1);
    assert!(original.exists());
    assert!(!copy.exists());
}

#[test]
fn test_root_order_decides_survivor() {
    let base = tempdir().unwrap();
    let photos = base.path().join("photos");
    let backup = base.path().join("backup");
    let original = create(&photos, "img.raw", b"pixels");
    let copy = create(&backup, "img.raw", b"pixels");

    let roots = vec![backup, photos];
    let report = DuplicateFinder::new(DedupOptions::default(), prefer_roots(&roots))
        .run(&roots)
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(!original.exists());
    assert!(copy.exists());
}

#[test]
fn test_overlapping_roots_never_delete_a_file_for_itself() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    let only = create(&sub, "only.txt", b"single copy");
    create(dir.path(), "other.txt", b"unrelated!!");

    let roots = vec![dir.path().to_path_buf(), sub.clone()];
    let report = DuplicateFinder::new(DedupOptions::default(), prefer_roots(&roots))
        .run(&roots)
        .unwrap();

    assert_eq!(report.stats.files_indexed, 2);
    assert!(report.records.is_empty());
    assert!(only.exists());
}

#[test]
fn test_same_root_twice() {
    let dir = tempdir().unwrap();
    let a = create(dir.path(), "a.txt", b"same");
    let b = create(dir.path(), "b.txt", b"same");

    let roots = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
    let files = Indexer::new(WalkerConfig::default()).index(&roots).unwrap();
    assert_eq!(files.len(), 2);

    let report = DuplicateFinder::new(DedupOptions::default(), prefer_roots(&roots))
        .resolve(files)
        .unwrap();

    // Both files rank equally under prefer_roots, so neither is preferred
    assert!(report.records.is_empty());
    assert!(a.exists());
    assert!(b.exists());
}

#[cfg(unix)]
#[test]
fn test_root_reached_through_symlink_collapses() {
    let base = tempdir().unwrap();
    let real = base.path().join("real");
    let file = create(&real, "data.bin", b"only once");
    let alias = base.path().join("alias");
    std::os::unix::fs::symlink(&real, &alias).unwrap();

    let roots = vec![real.clone(), alias.clone()];
    let report = DuplicateFinder::new(DedupOptions::default(), prefer_roots(&roots))
        .run(&roots)
        .unwrap();

    assert_eq!(report.stats.files_indexed, 1);
    assert!(report.records.is_empty());
    assert!(file.exists());
}

#[cfg(unix)]
#[test]
fn test_followed_directory_link_collapses() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    let file = create(&real, "data.bin", b"only once");
    std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

    let options = DedupOptions::default().with_follow_symlinks(true);
    let roots = vec![dir.path().to_path_buf()];
    let report = DuplicateFinder::new(options, prefer_roots(&roots))
        .run(&roots)
        .unwrap();

    assert_eq!(report.stats.files_indexed, 1);
    assert!(report.records.is_empty());
    assert!(file.exists());
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    let visible = create(dir.path(), "a.txt", b"dup");
    let hidden = create(&dir.path().join(".cache"), "a.txt", b"dup");

    let options = DedupOptions::default().with_skip_hidden(true);
    let roots = vec![dir.path().to_path_buf()];
    let report = DuplicateFinder::new(options, |_: &FileDescriptor, _: &FileDescriptor| true)
        .run(&roots)
        .unwrap();

    assert_eq!(report.stats.files_indexed, 1);
    assert!(report.records.is_empty());
    assert!(visible.exists());
    assert!(hidden.exists());
}
