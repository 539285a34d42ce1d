//! The safe deletion primitive.
//!
//! # Overview
//!
//! [`resolve_duplicate`] is the only place in the crate that removes files.
//! It never trusts its caller: every call re-proves, against the live
//! filesystem and immediately before mutating, that `delete` is a duplicate
//! of `keep`:
//!
//! 1. both paths are resolved; the same directory entry is never a duplicate
//!    of itself
//! 2. hard links of one inode are duplicates by definition
//! 3. anything else must compare byte-identical
//!
//! Only then is `delete` removed, or atomically replaced by a symbolic or
//! hard link pointing at `keep`. After the mutation `keep` must still exist; if it
//! does not, [`DedupError::InvariantViolation`] is raised and the caller is
//! expected to stop everything.
//!
//! # Example
//!
//! ```no_run
//! use rustdedup::actions::delete::{delete_duplicate_file, DeleteOptions};
//! use std::path::Path;
//!
//! let options = DeleteOptions::default().with_dry_run(true);
//! let confirmed = delete_duplicate_file(Path::new("copy.txt"), Path::new("orig.txt"), &options)?;
//! # Ok::<(), rustdedup::DedupError>(())
//! ```

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DedupError;
use crate::scanner::identity::{is_hardlink, same_device, same_file};
use crate::scanner::{identical_files, DEFAULT_CHUNK_SIZE};

/// What to leave behind at the path of a deleted duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceWith {
    /// Leave nothing.
    #[default]
    None,
    /// A symbolic link to the kept file.
    Symlink,
    /// A hard link to the kept file. Both files must share a device.
    Hardlink,
}

/// How a confirmed or rejected pair was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Not a duplicate (different content, or the same entry twice).
    NotDuplicate,
    /// The duplicate was removed.
    Deleted,
    /// The duplicate was replaced by a symbolic link.
    ReplacedWithSymlink,
    /// The duplicate was replaced by a hard link.
    ReplacedWithHardlink,
    /// Confirmed, but nothing was touched because of dry run.
    DryRun,
    /// Confirmed hard link of `keep`; left in place.
    HardlinkRetained,
}

impl DeleteOutcome {
    /// Whether duplication was confirmed.
    #[must_use]
    pub fn is_duplicate(self) -> bool {
        self != Self::NotDuplicate
    }

    /// Short human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NotDuplicate => "not a duplicate",
            Self::Deleted => "deleted",
            Self::ReplacedWithSymlink => "replaced with symlink",
            Self::ReplacedWithHardlink => "replaced with hardlink",
            Self::DryRun => "would delete",
            Self::HardlinkRetained => "hardlink retained",
        }
    }
}

/// Options for [`resolve_duplicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Verify, but never mutate.
    pub dry_run: bool,
    /// What to put in place of a deleted file.
    pub replace_with: ReplaceWith,
    /// Also delete files that are hard links of the kept file.
    pub delete_hardlinks: bool,
    /// Buffer size for the byte comparison.
    pub chunk_size: usize,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            replace_with: ReplaceWith::None,
            delete_hardlinks: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl DeleteOptions {
    /// Enable or disable dry run.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the replacement left behind for deleted files.
    #[must_use]
    pub fn with_replace_with(mut self, replace_with: ReplaceWith) -> Self {
        self.replace_with = replace_with;
        self
    }

    /// Allow deleting hard links of the kept file.
    #[must_use]
    pub fn with_delete_hardlinks(mut self, delete_hardlinks: bool) -> Self {
        self.delete_hardlinks = delete_hardlinks;
        self
    }

    /// Set the comparison buffer size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Delete `delete` if it is proven to duplicate `keep`.
///
/// Returns `true` iff duplication was confirmed, whether or not anything
/// was mutated (dry run, retained hard link).
///
/// # Errors
///
/// See [`resolve_duplicate`].
pub fn delete_duplicate_file(
    delete: &Path,
    keep: &Path,
    options: &DeleteOptions,
) -> Result<bool, DedupError> {
    resolve_duplicate(delete, keep, options).map(DeleteOutcome::is_duplicate)
}

/// Verify and apply one deletion, returning exactly what happened.
///
/// # Errors
///
/// - `InvalidArgument` if either path is empty
/// - `PreconditionViolation` if `delete` is a symbolic link
/// - `CrossDevice` if hard link replacement is requested across devices
/// - `InvariantViolation` if `keep` is gone after the mutation
/// - I/O errors from resolving, comparing, removing, or linking
///
/// A replacement link is built beside `delete` and renamed over it, so a
/// failed link leaves `delete` in place.
pub fn resolve_duplicate(
    delete: &Path,
    keep: &Path,
    options: &DeleteOptions,
) -> Result<DeleteOutcome, DedupError> {
    let kind = options.replace_with;
    resolve_with(delete, keep, options, |target, at| make_link(kind, target, at))
}

/// [`resolve_duplicate`] with the link step supplied by the caller.
///
/// `link(target, at)` must create a link to `target` at the unused path `at`.
fn resolve_with<L>(
    delete: &Path,
    keep: &Path,
    options: &DeleteOptions,
    link: L,
) -> Result<DeleteOutcome, DedupError>
where
    L: FnOnce(&Path, &Path) -> io::Result<()>,
{
    if delete.as_os_str().is_empty() || keep.as_os_str().is_empty() {
        return Err(DedupError::InvalidArgument(
            "deletion requires two non-empty paths".to_string(),
        ));
    }

    let delete_meta = fs::symlink_metadata(delete).map_err(|e| DedupError::io(delete, e))?;
    if delete_meta.file_type().is_symlink() {
        return Err(DedupError::PreconditionViolation(delete.to_path_buf()));
    }

    if options.replace_with == ReplaceWith::Hardlink && !same_device(delete, keep)? {
        return Err(DedupError::CrossDevice {
            delete: delete.to_path_buf(),
            keep: keep.to_path_buf(),
        });
    }

    let real_delete = fs::canonicalize(delete).map_err(|e| DedupError::io(delete, e))?;
    let real_keep = fs::canonicalize(keep).map_err(|e| DedupError::io(keep, e))?;

    if same_file(&real_delete, &real_keep) {
        log::debug!(
            "Same entry, not a duplicate: {} / {}",
            delete.display(),
            keep.display()
        );
        return Ok(DeleteOutcome::NotDuplicate);
    }

    let hardlinked = is_hardlink(&real_delete, &real_keep)?;
    if !hardlinked && !identical_files(&real_delete, &real_keep, options.chunk_size)? {
        log::debug!(
            "Content differs, keeping both: {} / {}",
            delete.display(),
            keep.display()
        );
        return Ok(DeleteOutcome::NotDuplicate);
    }

    let mutate = !hardlinked
        || (options.delete_hardlinks && options.replace_with != ReplaceWith::Hardlink);
    if !mutate {
        log::debug!(
            "Hard link of {} retained: {}",
            keep.display(),
            delete.display()
        );
        return Ok(DeleteOutcome::HardlinkRetained);
    }

    if options.dry_run {
        log::debug!("Dry run, not deleting: {}", delete.display());
        return Ok(DeleteOutcome::DryRun);
    }

    let outcome = match options.replace_with {
        ReplaceWith::None => {
            fs::remove_file(&real_delete).map_err(|e| {
                log::error!("Delete failed for {}: {}", real_delete.display(), e);
                DedupError::io(&real_delete, e)
            })?;
            DeleteOutcome::Deleted
        }
        ReplaceWith::Symlink => {
            replace_with_link(&real_keep, &real_delete, link)?;
            DeleteOutcome::ReplacedWithSymlink
        }
        ReplaceWith::Hardlink => {
            replace_with_link(&real_keep, &real_delete, link)?;
            DeleteOutcome::ReplacedWithHardlink
        }
    };

    ensure_kept(&real_delete, &real_keep)?;

    log::debug!(
        "{}: {} (kept {})",
        outcome.label(),
        real_delete.display(),
        real_keep.display()
    );
    Ok(outcome)
}

/// Swap `delete` for a link to `keep` in one rename.
///
/// On any failure `delete` is untouched and the staging name is cleaned up.
fn replace_with_link<L>(keep: &Path, delete: &Path, link: L) -> Result<(), DedupError>
where
    L: FnOnce(&Path, &Path) -> io::Result<()>,
{
    let staged = staging_path(delete);
    link(keep, &staged).map_err(|e| {
        log::error!("Link failed for {}: {}", staged.display(), e);
        DedupError::io(&staged, e)
    })?;

    if let Err(e) = fs::rename(&staged, delete) {
        log::error!("Replace failed for {}: {}", delete.display(), e);
        if let Err(cleanup) = fs::remove_file(&staged) {
            log::warn!("Could not remove {}: {}", staged.display(), cleanup);
        }
        return Err(DedupError::io(delete, e));
    }
    Ok(())
}

/// Hidden sibling of `path` used to stage a replacement link.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".rustdedup-{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Postcondition of every mutation: the kept copy still exists.
fn ensure_kept(deleted: &Path, kept: &Path) -> Result<(), DedupError> {
    if kept.try_exists().unwrap_or(false) {
        return Ok(());
    }
    log::error!(
        "Kept file {} vanished after deleting {}",
        kept.display(),
        deleted.display()
    );
    Err(DedupError::InvariantViolation {
        deleted: deleted.to_path_buf(),
        kept: kept.to_path_buf(),
    })
}

fn make_link(kind: ReplaceWith, target: &Path, at: &Path) -> io::Result<()> {
    match kind {
        ReplaceWith::None => Ok(()),
        ReplaceWith::Symlink => make_symlink(target, at),
        ReplaceWith::Hardlink => fs::hard_link(target, at),
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, at: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, at)
}

#[cfg(windows)]
fn make_symlink(target: &Path, at: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, at)
}
