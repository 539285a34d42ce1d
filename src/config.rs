//! Run options.
//!
//! [`DedupOptions`] carries everything one deduplication run needs besides
//! the roots and the decision function. It is built in code (or from CLI
//! flags); nothing is read from or written to disk.
//!
//! ```
//! use rustdedup::actions::ReplaceWith;
//! use rustdedup::config::DedupOptions;
//!
//! let options = DedupOptions::default()
//!     .with_dry_run(true)
//!     .with_replace_with(ReplaceWith::Symlink)
//!     .with_io_threads(2);
//! assert!(options.dry_run);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::actions::delete::{DeleteOptions, ReplaceWith};
use crate::progress::ProgressCallback;
use crate::scanner::{Hasher, WalkerConfig, DEFAULT_CHUNK_SIZE};

/// Files larger than this are pre-filtered by a partial checksum.
pub const DEFAULT_PARTIAL_HASH_THRESHOLD: u64 = 1024 * 1024;

/// Default number of checksum threads; small to avoid disk thrashing.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Options for one deduplication run.
#[derive(Clone)]
pub struct DedupOptions {
    /// Verify duplicates but never mutate the filesystem.
    pub dry_run: bool,
    /// Log every decision at info level instead of debug.
    pub verbose: bool,
    /// What to leave in place of a deleted duplicate.
    pub replace_with: ReplaceWith,
    /// Delete files that are hard links of the kept copy.
    pub delete_hardlinks: bool,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Skip names starting with `.`.
    pub skip_hidden: bool,
    /// Ignore files smaller than this many bytes.
    pub min_size: Option<u64>,
    /// Ignore files larger than this many bytes.
    pub max_size: Option<u64>,
    /// Comparison buffer and partial checksum window, in bytes.
    pub chunk_size: usize,
    /// Same-size groups above this size get a partial checksum pass.
    pub partial_hash_threshold: u64,
    /// Threads used for checksum computation.
    pub io_threads: usize,
    /// Skip a failing size group instead of aborting the run.
    pub continue_on_error: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DedupOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupOptions")
            .field("dry_run", &self.dry_run)
            .field("verbose", &self.verbose)
            .field("replace_with", &self.replace_with)
            .field("delete_hardlinks", &self.delete_hardlinks)
            .field("follow_symlinks", &self.follow_symlinks)
            .field("skip_hidden", &self.skip_hidden)
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("chunk_size", &self.chunk_size)
            .field("partial_hash_threshold", &self.partial_hash_threshold)
            .field("io_threads", &self.io_threads)
            .field("continue_on_error", &self.continue_on_error)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verbose: false,
            replace_with: ReplaceWith::None,
            delete_hardlinks: false,
            follow_symlinks: false,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            partial_hash_threshold: DEFAULT_PARTIAL_HASH_THRESHOLD,
            io_threads: DEFAULT_IO_THREADS,
            continue_on_error: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl DedupOptions {
    /// Verify only; never delete.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Log decisions at info level.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the replacement for deleted duplicates.
    #[must_use]
    pub fn with_replace_with(mut self, replace_with: ReplaceWith) -> Self {
        self.replace_with = replace_with;
        self
    }

    /// Allow deleting hard links of the kept copy.
    #[must_use]
    pub fn with_delete_hardlinks(mut self, delete_hardlinks: bool) -> Self {
        self.delete_hardlinks = delete_hardlinks;
        self
    }

    /// Descend into symlinked directories.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Skip hidden files and directories.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set the size window of indexed files.
    #[must_use]
    pub fn with_size_range(mut self, min_size: Option<u64>, max_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Set the comparison buffer and partial checksum window (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the size above which same-size groups get a partial checksum pass.
    #[must_use]
    pub fn with_partial_hash_threshold(mut self, threshold: u64) -> Self {
        self.partial_hash_threshold = threshold;
        self
    }

    /// Set the number of checksum threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Collect per-group errors instead of aborting.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Traversal settings for the indexer.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            min_size: self.min_size,
            max_size: self.max_size,
        }
    }

    /// Options for the deletion primitive.
    #[must_use]
    pub fn delete_options(&self) -> DeleteOptions {
        DeleteOptions::default()
            .with_dry_run(self.dry_run)
            .with_replace_with(self.replace_with)
            .with_delete_hardlinks(self.delete_hardlinks)
            .with_chunk_size(self.chunk_size)
    }

    /// Checksum calculator using the configured partial window.
    #[must_use]
    pub fn hasher(&self) -> Hasher {
        Hasher::new().with_chunk_size(self.chunk_size)
    }
}
