//! Directory traversal.
//!
//! # Overview
//!
//! [`Walker`] visits every directory under a root and yields one
//! [`DirListing`] per directory: the directory path plus the names of its
//! subdirectories and of everything else in it. Traversal is built on
//! [`walkdir`], which also provides loop detection when symlinks are
//! followed.
//!
//! Following symlinks only affects which *directories* are descended into.
//! Symlinks that end up in `files` are still links; the indexer drops them.
//!
//! # Example
//!
//! ```no_run
//! use rustdedup::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), &WalkerConfig::default());
//! for listing in walker.walk() {
//!     let listing = listing?;
//!     println!("{}: {} files", listing.dir.display(), listing.files.len());
//! }
//! # Ok::<(), rustdedup::DedupError>(())
//! ```

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::WalkerConfig;
use crate::error::DedupError;

/// Contents of one visited directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Directory path, as reached from the walk root
    pub dir: PathBuf,
    /// Names of entries that will be descended into
    pub subdirs: Vec<OsString>,
    /// Names of all other entries (regular files, symlinks, special files)
    pub files: Vec<OsString>,
}

/// Directory walker yielding one [`DirListing`] per directory.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    skip_hidden: bool,
}

impl Walker {
    /// Create a walker for `root` using the traversal settings of `config`.
    #[must_use]
    pub fn new(root: &Path, config: &WalkerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            follow_symlinks: config.follow_symlinks,
            skip_hidden: config.skip_hidden,
        }
    }

    /// Walk the tree, yielding listings in depth-first order.
    ///
    /// Errors are yielded rather than skipped; the caller decides whether
    /// to stop.
    pub fn walk(&self) -> impl Iterator<Item = Result<DirListing, DedupError>> + '_ {
        let skip_hidden = self.skip_hidden;

        WalkDir::new(&self.root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !(skip_hidden && e.depth() > 0 && is_hidden(e.file_name())))
            .filter_map(move |entry| match entry {
                Ok(e) if e.file_type().is_dir() => Some(self.list_dir(e.path())),
                Ok(_) => None,
                Err(e) => Some(Err(DedupError::Walk(e))),
            })
    }

    /// Split the entries of `dir` into subdirectories and other names.
    fn list_dir(&self, dir: &Path) -> Result<DirListing, DedupError> {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| DedupError::io(dir, e))? {
            let entry = entry.map_err(|e| DedupError::io(dir, e))?;
            let name = entry.file_name();
            if self.skip_hidden && is_hidden(&name) {
                log::trace!("Skipping hidden entry: {}", entry.path().display());
                continue;
            }

            let file_type = entry.file_type().map_err(|e| DedupError::io(&entry.path(), e))?;
            let descend = if file_type.is_dir() {
                true
            } else if file_type.is_symlink() && self.follow_symlinks {
                // Dangling links stay in `files`, where the indexer drops them.
                fs::metadata(entry.path()).is_ok_and(|m| m.is_dir())
            } else {
                false
            };

            if descend {
                subdirs.push(name);
            } else {
                files.push(name);
            }
        }

        subdirs.sort();
        files.sort();

        Ok(DirListing {
            dir: dir.to_path_buf(),
            subdirs,
            files,
        })
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}
