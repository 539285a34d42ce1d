//! Command-line interface definitions.
//!
//! A single command: every positional argument is a search root, in
//! priority order for `--keep first-root`.
//!
//! # Example
//!
//! ```bash
//! # Show what would be removed from the backup
//! rustdedup --dry-run ~/photos ~/backup/photos
//!
//! # Replace duplicates by symlinks, keeping the oldest copy
//! rustdedup --keep oldest --replace-with symlink ~/music
//!
//! # Only large files, machine-readable output
//! rustdedup --min-size 10MiB --json ~/downloads
//! ```

use std::path::PathBuf;

use bytesize::ByteSize;
use clap::{Parser, ValueEnum};

use crate::actions::ReplaceWith;
use crate::config::DedupOptions;
use crate::duplicates::KeepPolicy;

/// Find duplicate files and delete the redundant copies.
///
/// Every deletion is preceded by a byte-for-byte comparison with the copy
/// that is kept.
#[derive(Debug, Parser)]
#[command(name = "rustdedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verify duplicates but do not delete anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Which copy of a duplicate to keep
    #[arg(long, value_enum, value_name = "POLICY", default_value = "first-root")]
    pub keep: KeepArg,

    /// What to leave in place of a deleted duplicate
    #[arg(long, value_enum, value_name = "KIND", default_value = "none")]
    pub replace_with: ReplaceArg,

    /// Also delete files that are hard links of the kept copy
    #[arg(long)]
    pub delete_hardlinks: bool,

    /// Descend into symlinked directories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1GB, 1GiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Number of I/O threads for checksums
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", env = "RUSTDEDUP_IO_THREADS", default_value = "4")]
    pub io_threads: usize,

    /// Skip groups that fail instead of aborting the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Print the report, and errors, as JSON
    #[arg(long)]
    pub json: bool,

    /// Directories to search, highest priority first
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,
}

impl Cli {
    /// Run options described by these flags.
    #[must_use]
    pub fn options(&self) -> DedupOptions {
        DedupOptions::default()
            .with_dry_run(self.dry_run)
            .with_verbose(self.verbose > 0)
            .with_replace_with(self.replace_with.into())
            .with_delete_hardlinks(self.delete_hardlinks)
            .with_follow_symlinks(self.follow_symlinks)
            .with_skip_hidden(self.skip_hidden)
            .with_size_range(self.min_size, self.max_size)
            .with_io_threads(self.io_threads)
            .with_continue_on_error(self.continue_on_error)
    }
}

/// `--keep` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeepArg {
    /// Keep the copy under the earliest PATH
    FirstRoot,
    /// Keep the copy with the shortest path
    ShortestPath,
    /// Keep the least recently modified copy
    Oldest,
    /// Keep the most recently modified copy
    Newest,
}

impl From<KeepArg> for KeepPolicy {
    fn from(arg: KeepArg) -> Self {
        match arg {
            KeepArg::FirstRoot => Self::FirstRoot,
            KeepArg::ShortestPath => Self::ShortestPath,
            KeepArg::Oldest => Self::Oldest,
            KeepArg::Newest => Self::Newest,
        }
    }
}

/// `--replace-with` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplaceArg {
    /// Delete only
    None,
    /// Leave a symbolic link to the kept copy
    Symlink,
    /// Leave a hard link to the kept copy
    Hardlink,
}

impl From<ReplaceArg> for ReplaceWith {
    fn from(arg: ReplaceArg) -> Self {
        match arg {
            ReplaceArg::None => Self::None,
            ReplaceArg::Symlink => Self::Symlink,
            ReplaceArg::Hardlink => Self::Hardlink,
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Numbers without a unit are bytes; `KB`/`MB`/... are decimal and
/// `KiB`/`MiB`/... binary.
///
/// ```
/// use rustdedup::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
///
/// # Errors
///
/// Returns an error for empty input, a bad number, or an unknown unit.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    s.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
