//! Adler-32 content checksums used as partition keys.
//!
//! # Overview
//!
//! Two keys are computed, both streaming through a buffered reader:
//! - **partial**: the first `chunk_size` bytes only (default 1 MiB), a cheap
//!   pre-filter for large same-size files
//! - **full**: the complete file content
//!
//! A 32-bit checksum collides by construction. That is fine: equal keys only
//! mean "compare these", never "these are equal".

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use simd_adler32::bufread::adler32;

use super::compare::DEFAULT_CHUNK_SIZE;
use crate::error::DedupError;

/// Read buffer for checksum streaming.
const IN_BUFFER_SIZE: usize = 131_072;

/// Checksum calculator.
///
/// Cheap to copy; carries only the partial-hash window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 1 MiB partial window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the number of leading bytes covered by [`partial`](Self::partial).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Current partial window in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Checksum of the first `chunk_size` bytes of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn partial(&self, path: &Path) -> Result<u32, DedupError> {
        let file = File::open(path).map_err(|e| DedupError::io(path, e))?;
        let mut reader =
            BufReader::with_capacity(IN_BUFFER_SIZE, file).take(self.chunk_size as u64);
        let sum = adler32(&mut reader).map_err(|e| DedupError::io(path, e))?;
        log::trace!("Partial checksum {:08x}: {}", sum, path.display());
        Ok(sum)
    }

    /// Checksum of the complete content of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn full(&self, path: &Path) -> Result<u32, DedupError> {
        let file = File::open(path).map_err(|e| DedupError::io(path, e))?;
        let mut reader = BufReader::with_capacity(IN_BUFFER_SIZE, file);
        let sum = adler32(&mut reader).map_err(|e| DedupError::io(path, e))?;
        log::trace!("Full checksum {:08x}: {}", sum, path.display());
        Ok(sum)
    }
}
