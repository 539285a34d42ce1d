use clap::Parser;
use rustdedup::cli::Cli;
use rustdedup::{run_app, DedupError, ExitCode};
use std::fs;
use tempfile::tempdir;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("rustdedup").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_run_app_exit_codes() {
    let base = tempdir().unwrap();
    let dir1 = base.path().join("dir1");
    let dir2 = base.path().join("dir2");
    fs::create_dir_all(&dir1).unwrap();
    fs::create_dir_all(&dir2).unwrap();
    fs::write(dir1.join("fileA"), b"cli content").unwrap();
    fs::write(dir2.join("fileA"), b"cli content").unwrap();
    let d1 = dir1.to_str().unwrap();
    let d2 = dir2.to_str().unwrap();

    let dry = run_app(cli(&["--quiet", "--dry-run", "--json", d1, d2])).unwrap();
    assert_eq!(dry, ExitCode::Success);
    assert!(dir2.join("fileA").exists());

    let code = run_app(cli(&["--quiet", d1, d2])).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(dir1.join("fileA").exists());
    assert!(!dir2.join("fileA").exists());

    let again = run_app(cli(&["--quiet", d1, d2])).unwrap();
    assert_eq!(again, ExitCode::NoDuplicates);
}

#[test]
fn test_run_app_missing_path() {
    let base = tempdir().unwrap();
    let missing = base.path().join("missing");

    let err = run_app(cli(&["--quiet", missing.to_str().unwrap()])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DedupError>(),
        Some(DedupError::NotFound(_))
    ));
}
