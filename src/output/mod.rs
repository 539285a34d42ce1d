//! Result output.
//!
//! - plain text: one `deleted -> kept` line per confirmed pair
//! - [`json`]: the full report for scripting

pub mod json;

use std::io::{self, Write};

use crate::actions::DeleteOutcome;
use crate::duplicates::DeletionRecord;

pub use json::JsonOutput;

/// Write one line per record.
///
/// Records that did not plainly delete carry the outcome in parentheses.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_records<W: Write>(writer: &mut W, records: &[DeletionRecord]) -> io::Result<()> {
    for record in records {
        write!(
            writer,
            "{} -> {}",
            record.deleted.display_path().display(),
            record.kept.display_path().display()
        )?;
        if record.outcome != DeleteOutcome::Deleted {
            write!(writer, " ({})", record.outcome.label())?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
