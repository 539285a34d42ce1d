//! Error taxonomy and exit codes.
//!
//! Every fallible library operation returns [`DedupError`]. The binary maps
//! the outcome of a run onto an [`ExitCode`].

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Errors raised while indexing, comparing, or deleting files.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Malformed call: empty path, or a file compared against itself.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The file chosen for deletion is a symbolic link.
    #[error("refusing to delete through symbolic link: {0}")]
    PreconditionViolation(PathBuf),

    /// Hard link replacement requested across filesystems.
    #[error("cannot hard link {delete} to {keep}: files are on different devices")]
    CrossDevice {
        /// File that would have been replaced
        delete: PathBuf,
        /// Link target
        keep: PathBuf,
    },

    /// The kept copy vanished after its duplicate was deleted.
    #[error("kept file {kept} is missing after deleting {deleted}; aborting")]
    InvariantViolation {
        /// File that was deleted
        deleted: PathBuf,
        /// File that should have survived
        kept: PathBuf,
    },

    /// The path was not found.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A search root is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory traversal failed.
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The checksum thread pool could not be created.
    #[error("failed to build checksum thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was stopped by a shutdown request.
    #[error("interrupted by user")]
    Interrupted,
}

impl DedupError {
    /// Classify an I/O error against the path it happened on.
    #[must_use]
    pub fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Whether this error must halt all further processing.
    ///
    /// A fatal error is never collected under `continue_on_error`.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. } | Self::Interrupted)
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::PreconditionViolation(p)
            | Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotADirectory(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::CrossDevice { delete, .. } => Some(delete),
            Self::InvariantViolation { kept, .. } => Some(kept),
            Self::Walk(e) => e.path(),
            Self::InvalidArgument(_) | Self::ThreadPool(_) | Self::Interrupted => None,
        }
    }
}

/// Exit codes for the rustdedup binary.
///
/// - 0: Success (duplicates were resolved)
/// - 1: General error
/// - 2: No duplicates found
/// - 3: Partial success (some groups failed under `--continue-on-error`)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found and resolved.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The run completed but no duplicates were found.
    NoDuplicates = 2,
    /// The run completed but some groups were skipped because of errors.
    PartialSuccess = 3,
    /// The run was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::NoDuplicates => "DD002",
            Self::PartialSuccess => "DD003",
            Self::Interrupted => "DD130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
