//! Scanner module: the file model and everything that reads the filesystem.
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal yielding `(dir, subdirs, files)` listings
//! - [`indexer`]: Builds the deduplicated [`FileDescriptor`] collection
//! - [`identity`]: Same-entry and hard link checks
//! - [`compare`]: Streaming byte-exact comparison
//! - [`hasher`]: Adler-32 partial and full content checksums
//! - [`path_utils`]: Textual path normalization
//!
//! # Example
//!
//! ```no_run
//! use rustdedup::scanner::{Indexer, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let indexer = Indexer::new(WalkerConfig::default());
//! let files = indexer.index(&[PathBuf::from("dir1"), PathBuf::from("dir2")]).unwrap();
//! for file in &files {
//!     println!("{}: {} bytes", file.real_path.display(), file.size());
//! }
//! ```

pub mod compare;
pub mod hasher;
pub mod identity;
pub mod indexer;
pub mod path_utils;
pub mod walker;

use std::ffi::OsString;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

pub use compare::{identical_files, DEFAULT_CHUNK_SIZE};
pub use hasher::Hasher;
pub use identity::{is_hardlink, same_file};
pub use indexer::Indexer;
pub use walker::{DirListing, Walker};

/// Stat fields needed for identity, hard link, and size checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// Device id of the filesystem holding the file
    pub dev: u64,
    /// Inode number
    pub ino: u64,
    /// File size in bytes
    pub size: u64,
    /// Number of hard links to the inode
    pub nlink: u64,
    /// Last modification time
    pub modified: Option<SystemTime>,
}

impl FileMeta {
    /// Extract the fields from file metadata.
    ///
    /// On platforms without inode numbers, `dev`, `ino` and `nlink` are zero
    /// and hard link detection is disabled.
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            Self {
                dev: metadata.dev(),
                ino: metadata.ino(),
                size: metadata.len(),
                nlink: metadata.nlink(),
                modified: metadata.modified().ok(),
            }
        }
        #[cfg(not(unix))]
        {
            Self {
                dev: 0,
                ino: 0,
                size: metadata.len(),
                nlink: 0,
                modified: metadata.modified().ok(),
            }
        }
    }
}

/// Key naming one directory entry on one filesystem.
///
/// Two descriptors reached through overlapping search roots share this key
/// and collapse into one during indexing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    /// File name
    pub base_name: OsString,
    /// Inode of the containing directory
    pub dir_inode: u64,
    /// Device id
    pub dev: u64,
}

/// Immutable record of one on-disk regular file and how it was reached.
///
/// Never describes a symbolic link: the indexer drops link entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Search root exactly as the caller gave it
    pub start: PathBuf,
    /// Search root with symlinks resolved
    pub real_start: PathBuf,
    /// Path of the file relative to `real_start`, as walked
    pub rel_path: PathBuf,
    /// Fully resolved absolute path
    pub real_path: PathBuf,
    /// Directory component of `real_path`
    pub dir_name: PathBuf,
    /// Inode of the containing directory
    pub dir_inode: u64,
    /// File name
    pub base_name: OsString,
    /// Stat fields
    pub metadata: FileMeta,
}

impl FileDescriptor {
    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.metadata.size
    }

    /// Identity key used to collapse aliases during indexing.
    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            base_name: self.base_name.clone(),
            dir_inode: self.dir_inode,
            dev: self.metadata.dev,
        }
    }

    /// Path as seen from the caller's root, for display.
    #[must_use]
    pub fn display_path(&self) -> PathBuf {
        self.start.join(&self.rel_path)
    }
}

/// Configuration for directory walking and indexing.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links to directories during traversal.
    /// Symlinked files are excluded from the index regardless.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Minimum file size to include (in bytes).
    pub min_size: Option<u64>,

    /// Maximum file size to include (in bytes).
    pub max_size: Option<u64>,
}

impl WalkerConfig {
    /// Check if a file passes the size filters.
    #[must_use]
    pub fn passes_size_filter(&self, size: u64) -> bool {
        self.min_size.is_none_or(|min| size >= min) && self.max_size.is_none_or(|max| size <= max)
    }
}
