//! Builds the deduplicated descriptor collection for a set of search roots.
//!
//! Every regular file under every root becomes one [`FileDescriptor`].
//! Descriptors are stored in a map keyed by [`IdentityKey`], so a file
//! reached through two overlapping roots (or through a symlinked directory)
//! is kept once; the last one walked wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::walker::Walker;
use super::{FileDescriptor, FileMeta, IdentityKey, WalkerConfig};
use crate::error::DedupError;
use crate::progress::ProgressCallback;

/// Walks search roots and produces [`FileDescriptor`]s.
#[derive(Clone, Default)]
pub struct Indexer {
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Indexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Indexer {
    /// Create an indexer with the given traversal settings.
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Index all `roots`, merging aliases of the same directory entry.
    ///
    /// The order of the returned descriptors is not significant.
    ///
    /// # Errors
    ///
    /// - `NotFound` / `NotADirectory` for a bad root
    /// - any I/O or traversal error; nothing is skipped silently
    /// - `Interrupted` if the shutdown flag is raised
    pub fn index(&self, roots: &[PathBuf]) -> Result<Vec<FileDescriptor>, DedupError> {
        let mut index: HashMap<IdentityKey, FileDescriptor> = HashMap::new();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        for root in roots {
            self.index_root(root, &mut index)?;
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!(
            "Indexed {} distinct files under {} root(s)",
            index.len(),
            roots.len()
        );
        Ok(index.into_values().collect())
    }

    fn index_root(
        &self,
        start: &Path,
        index: &mut HashMap<IdentityKey, FileDescriptor>,
    ) -> Result<(), DedupError> {
        let meta = fs::metadata(start).map_err(|e| DedupError::io(start, e))?;
        if !meta.is_dir() {
            return Err(DedupError::NotADirectory(start.to_path_buf()));
        }
        let real_start = fs::canonicalize(start).map_err(|e| DedupError::io(start, e))?;
        log::debug!(
            "Indexing root {} (resolved to {})",
            start.display(),
            real_start.display()
        );

        for listing in Walker::new(&real_start, &self.config).walk() {
            if self.is_shutdown_requested() {
                log::debug!("Indexer: Shutdown requested, stopping");
                return Err(DedupError::Interrupted);
            }
            let listing = listing?;

            for name in &listing.files {
                let path = listing.dir.join(name);
                let Some(descriptor) = self.describe(start, &real_start, &path)? else {
                    continue;
                };

                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(index.len() + 1, &path.to_string_lossy());
                }

                if let Some(previous) = index.insert(descriptor.identity_key(), descriptor) {
                    log::trace!(
                        "Collapsed alias of {} reached again via {}",
                        previous.real_path.display(),
                        path.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Build a descriptor for `path`, or `None` if it is not an indexable
    /// regular file.
    fn describe(
        &self,
        start: &Path,
        real_start: &Path,
        path: &Path,
    ) -> Result<Option<FileDescriptor>, DedupError> {
        let link_meta = fs::symlink_metadata(path).map_err(|e| DedupError::io(path, e))?;
        if link_meta.file_type().is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return Ok(None);
        }
        if !link_meta.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return Ok(None);
        }
        if !self.config.passes_size_filter(link_meta.len()) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                link_meta.len(),
                path.display()
            );
            return Ok(None);
        }

        let real_path = fs::canonicalize(path).map_err(|e| DedupError::io(path, e))?;
        let (Some(dir_name), Some(base_name)) = (real_path.parent(), real_path.file_name()) else {
            return Ok(None);
        };
        let dir_meta = fs::metadata(dir_name).map_err(|e| DedupError::io(dir_name, e))?;

        Ok(Some(FileDescriptor {
            start: start.to_path_buf(),
            real_start: real_start.to_path_buf(),
            rel_path: path.strip_prefix(real_start).unwrap_or(path).to_path_buf(),
            dir_name: dir_name.to_path_buf(),
            dir_inode: FileMeta::from_metadata(&dir_meta).ino,
            base_name: base_name.to_os_string(),
            metadata: FileMeta::from_metadata(&link_meta),
            real_path,
        }))
    }
}
