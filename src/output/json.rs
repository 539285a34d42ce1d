//! JSON output for deduplication runs.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "records": [
//!     {
//!       "deleted": "/backup/photo.jpg",
//!       "kept": "/photos/photo.jpg",
//!       "size": 1024,
//!       "outcome": "deleted"
//!     }
//!   ],
//!   "errors": ["file not found: /backup/gone.jpg"],
//!   "summary": {
//!     "files_indexed": 100,
//!     "size_groups": 7,
//!     "partial_hashed": 4,
//!     "full_hashed": 12,
//!     "candidate_groups": 3,
//!     "verifications": 4,
//!     "groups_failed": 1,
//!     "bytes_reclaimed": 1024,
//!     "duration_ms": 42,
//!     "dry_run": false,
//!     "exit_code": 3,
//!     "exit_code_name": "DD003"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::actions::DeleteOutcome;
use crate::duplicates::{DedupReport, DeletionRecord, PipelineStats};
use crate::error::ExitCode;

/// One confirmed pair in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRecord {
    /// Resolved path of the deleted (or would-be deleted) file
    pub deleted: String,
    /// Resolved path of the surviving copy
    pub kept: String,
    /// File size in bytes
    pub size: u64,
    /// What was done
    pub outcome: DeleteOutcome,
}

impl From<&DeletionRecord> for JsonRecord {
    fn from(record: &DeletionRecord) -> Self {
        Self {
            deleted: record.deleted.real_path.to_string_lossy().into_owned(),
            kept: record.kept.real_path.to_string_lossy().into_owned(),
            size: record.deleted.size(),
            outcome: record.outcome,
        }
    }
}

/// Run statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Distinct files indexed
    pub files_indexed: usize,
    /// Same-size groups with two or more members
    pub size_groups: usize,
    /// Files partially checksummed
    pub partial_hashed: usize,
    /// Files fully checksummed
    pub full_hashed: usize,
    /// Groups that reached pairing
    pub candidate_groups: usize,
    /// Calls into the deletion primitive
    pub verifications: usize,
    /// Size groups skipped because of errors
    pub groups_failed: usize,
    /// Bytes freed (or that would be freed under dry run)
    pub bytes_reclaimed: u64,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    fn new(stats: &PipelineStats, dry_run: bool, exit_code: ExitCode) -> Self {
        Self {
            files_indexed: stats.files_indexed,
            size_groups: stats.size_groups,
            partial_hashed: stats.partial_hashed,
            full_hashed: stats.full_hashed,
            candidate_groups: stats.candidate_groups,
            verifications: stats.verifications,
            groups_failed: stats.groups_failed,
            bytes_reclaimed: stats.bytes_reclaimed,
            duration_ms: stats.duration.as_millis() as u64,
            dry_run,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Confirmed pairs
    pub records: Vec<JsonRecord>,
    /// Collected non-fatal errors, as messages
    pub errors: Vec<String>,
    /// Statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON view of a report.
    #[must_use]
    pub fn new(report: &DedupReport, dry_run: bool, exit_code: ExitCode) -> Self {
        Self {
            records: report.records.iter().map(JsonRecord::from).collect(),
            errors: report.errors.iter().map(ToString::to_string).collect(),
            summary: JsonSummary::new(&report.stats, dry_run, exit_code),
        }
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
