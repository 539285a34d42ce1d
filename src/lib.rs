//! rustdedup - duplicate file finder with verified deletion.
//!
//! Files are narrowed to duplicate candidates by size and Adler-32
//! checksums, then every pair is proven byte-identical (or hard-linked)
//! immediately before the redundant copy is removed. Which copy survives is
//! up to a caller-supplied decision function.
//!
//! ```no_run
//! use rustdedup::{deduplicate, DedupOptions};
//! use rustdedup::duplicates::policy::prefer_roots;
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("originals"), PathBuf::from("copies")];
//! let records = deduplicate(&roots, prefer_roots(&roots), DedupOptions::default())?;
//! println!("removed {} duplicate(s)", records.len());
//! # Ok::<(), rustdedup::DedupError>(())
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io;
use std::sync::Arc;

use anyhow::Context;

pub use config::DedupOptions;
pub use duplicates::{deduplicate, DedupReport, DeletionRecord, DuplicateFinder};
pub use error::{DedupError, ExitCode};
pub use scanner::FileDescriptor;

use crate::cli::Cli;
use crate::duplicates::KeepPolicy;
use crate::output::JsonOutput;
use crate::progress::Progress;

/// Run the command line application.
///
/// # Errors
///
/// Returns an error if the run fails. An interrupted run surfaces as
/// [`DedupError::Interrupted`] inside the `anyhow` error.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let handler = signal::install_handler().context("Failed to install Ctrl+C handler")?;
    let mut options = cli.options().with_shutdown_flag(handler.get_flag());
    if !cli.quiet && !cli.json {
        options = options.with_progress_callback(Arc::new(Progress::new(false)));
    }
    let dry_run = options.dry_run;

    let decision = KeepPolicy::from(cli.keep).decision(&cli.paths);
    let report = DuplicateFinder::new(options, decision).run(&cli.paths)?;

    let exit_code = if report.is_partial() {
        ExitCode::PartialSuccess
    } else if report.records.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let mut stdout = io::stdout().lock();
    if cli.json {
        JsonOutput::new(&report, dry_run, exit_code).write_to(&mut stdout, true)?;
    } else {
        output::write_records(&mut stdout, &report.records)?;
        for error in &report.errors {
            log::warn!("Skipped: {}", error);
        }
        log::info!(
            "{} duplicate(s), {} {} in {:.2?}",
            report.records.len(),
            bytesize::ByteSize(report.stats.bytes_reclaimed),
            if dry_run { "reclaimable" } else { "reclaimed" },
            report.stats.duration
        );
    }

    Ok(exit_code)
}
