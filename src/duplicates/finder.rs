//! The duplicate-resolution pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder`] narrows an indexed file population to verified
//! duplicates in four nested stages, each cheaper than the next:
//!
//! 1. **Size** - only files of equal size can be equal
//! 2. **Partial checksum** - Adler-32 of the first `chunk_size` bytes, only
//!    for groups of files larger than `partial_hash_threshold`
//! 3. **Full checksum** - Adler-32 of the whole file
//! 4. **Pairing** - the group is ordered by the caller's decision function
//!    and each candidate is offered to the deletion primitive together with
//!    its most preferred partner
//!
//! Checksums are partition keys only. Nothing is deleted until
//! [`resolve_duplicate`] has proven the pair byte-identical (or hard-linked).
//!
//! # Example
//!
//! ```no_run
//! use rustdedup::config::DedupOptions;
//! use rustdedup::duplicates::{policy, DuplicateFinder};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("photos"), PathBuf::from("backup")];
//! let options = DedupOptions::default().with_dry_run(true);
//! let finder = DuplicateFinder::new(options, policy::prefer_roots(&roots));
//!
//! let report = finder.run(&roots)?;
//! for record in &report.records {
//!     println!("{} -> {}", record.deleted.real_path.display(), record.kept.real_path.display());
//! }
//! # Ok::<(), rustdedup::DedupError>(())
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use rayon::ThreadPool;

use super::groups::{for_each_dup, for_each_keyed, keyed_par};
use crate::actions::delete::{resolve_duplicate, DeleteOptions, DeleteOutcome};
use crate::config::DedupOptions;
use crate::error::DedupError;
use crate::logging::decision_level;
use crate::scanner::{FileDescriptor, Hasher, Indexer};

/// One confirmed duplicate pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRecord {
    /// The file that was (or under dry run would be) removed
    pub deleted: FileDescriptor,
    /// The surviving copy
    pub kept: FileDescriptor,
    /// What the deletion primitive did
    pub outcome: DeleteOutcome,
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Distinct files produced by the indexer
    pub files_indexed: usize,
    /// Same-size groups with two or more members
    pub size_groups: usize,
    /// Files whose partial checksum was computed
    pub partial_hashed: usize,
    /// Files whose full checksum was computed
    pub full_hashed: usize,
    /// Groups that reached the pairing stage
    pub candidate_groups: usize,
    /// Calls into the deletion primitive
    pub verifications: usize,
    /// Size groups skipped because of an error
    pub groups_failed: usize,
    /// Bytes removed, or that would be removed under dry run.
    /// Retained hard links do not count.
    pub bytes_reclaimed: u64,
    /// Wall time of the run
    pub duration: Duration,
}

/// Result of a full run.
#[derive(Debug, Default)]
pub struct DedupReport {
    /// Confirmed pairs, in processing order
    pub records: Vec<DeletionRecord>,
    /// Non-fatal errors collected under `continue_on_error`
    pub errors: Vec<DedupError>,
    /// Counters
    pub stats: PipelineStats,
}

impl DedupReport {
    /// Whether some size groups were skipped because of errors.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Mutable state threaded through the stages of one run.
struct RunState {
    pool: ThreadPool,
    records: Vec<DeletionRecord>,
    stats: PipelineStats,
    errors: Vec<DedupError>,
    groups_done: usize,
}

/// Orchestrates indexing and the resolution stages.
///
/// `F` decides, for two suspected duplicates, whether the first should be
/// deleted in favor of the second. It must be a strict ordering and is
/// consulted for preference only.
pub struct DuplicateFinder<F> {
    options: DedupOptions,
    decision: F,
    hasher: Hasher,
    delete_options: DeleteOptions,
}

impl<F> DuplicateFinder<F>
where
    F: Fn(&FileDescriptor, &FileDescriptor) -> bool,
{
    /// Create a finder from run options and a decision function.
    #[must_use]
    pub fn new(options: DedupOptions, decision: F) -> Self {
        let hasher = options.hasher();
        let delete_options = options.delete_options();
        Self {
            options,
            decision,
            hasher,
            delete_options,
        }
    }

    /// Index `roots` and resolve every duplicate found in them.
    ///
    /// # Errors
    ///
    /// - any indexing error (bad root, traversal or stat failure)
    /// - the first resolution error, unless `continue_on_error` is set and
    ///   the error is not fatal
    /// - `Interrupted` once the shutdown flag is raised
    pub fn run(&self, roots: &[PathBuf]) -> Result<DedupReport, DedupError> {
        let started = Instant::now();
        log::info!("Indexing {} root(s)", roots.len());

        let mut indexer = Indexer::new(self.options.walker_config());
        if let Some(ref flag) = self.options.shutdown_flag {
            indexer = indexer.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.options.progress_callback {
            indexer = indexer.with_progress_callback(callback.clone());
        }
        let files = indexer.index(roots)?;

        let mut report = self.resolve(files)?;
        report.stats.duration = started.elapsed();
        Ok(report)
    }

    /// Resolve duplicates among already indexed files.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run), minus indexing.
    pub fn resolve(&self, files: Vec<FileDescriptor>) -> Result<DedupReport, DedupError> {
        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.io_threads)
            .build()?;

        let mut state = RunState {
            pool,
            records: Vec::new(),
            stats: PipelineStats {
                files_indexed: files.len(),
                ..Default::default()
            },
            errors: Vec::new(),
            groups_done: 0,
        };

        let total_groups = count_size_groups(&files);
        log::info!(
            "Resolving {} files in {} same-size group(s)",
            files.len(),
            total_groups
        );
        if let Some(ref callback) = self.options.progress_callback {
            callback.on_phase_start("resolve", total_groups);
        }

        let result = self.size_crc_del_dups(files, &mut state);

        if let Some(ref callback) = self.options.progress_callback {
            callback.on_phase_end("resolve");
        }
        result?;

        let records = state.records;
        state.stats.bytes_reclaimed = records
            .iter()
            .filter(|r| r.outcome != DeleteOutcome::HardlinkRetained)
            .map(|r| r.deleted.size())
            .sum();
        state.stats.duration = started.elapsed();

        log::info!(
            "Resolved {} duplicate(s), {} group(s) failed",
            records.len(),
            state.stats.groups_failed
        );

        Ok(DedupReport {
            records,
            errors: state.errors,
            stats: state.stats,
        })
    }

    /// Stage 1: group by size and route each group by its size.
    fn size_crc_del_dups(
        &self,
        files: Vec<FileDescriptor>,
        state: &mut RunState,
    ) -> Result<(), DedupError> {
        for_each_dup(
            files,
            |f| Ok::<_, DedupError>(f.size()),
            |group| self.size_group(group, state),
        )
    }

    /// Process one same-size group; the unit of `continue_on_error`.
    ///
    /// Pairs committed before a collected error stay in the report.
    fn size_group(
        &self,
        group: Vec<FileDescriptor>,
        state: &mut RunState,
    ) -> Result<(), DedupError> {
        if self.options.is_shutdown_requested() {
            log::info!("Resolution interrupted by shutdown signal");
            return Err(DedupError::Interrupted);
        }

        let size = group.first().map_or(0, FileDescriptor::size);
        state.groups_done += 1;
        state.stats.size_groups += 1;
        if let Some(ref callback) = self.options.progress_callback {
            if let Some(first) = group.first() {
                callback.on_progress(state.groups_done, &first.real_path.to_string_lossy());
            }
        }
        log::debug!("Size group: {} files of {} bytes", group.len(), size);

        let result = if size > self.options.partial_hash_threshold {
            self.partial_crc_del_dups(group, state)
        } else {
            self.crc_del_dups(group, state)
        };

        match result {
            Err(e) if self.options.continue_on_error && !e.is_fatal() => {
                log::warn!("Skipping group of {}-byte files: {}", size, e);
                state.stats.groups_failed += 1;
                state.errors.push(e);
                Ok(())
            }
            other => other,
        }
    }

    /// Stage 2: group by checksum of the leading `chunk_size` bytes.
    fn partial_crc_del_dups(
        &self,
        group: Vec<FileDescriptor>,
        state: &mut RunState,
    ) -> Result<(), DedupError> {
        let hasher = self.hasher;
        let keyed = keyed_par(&state.pool, group, |f: &FileDescriptor| {
            hasher.partial(&f.real_path)
        })?;
        state.stats.partial_hashed += keyed.len();

        for_each_keyed(keyed, |g| self.crc_del_dups(g, state))
    }

    /// Stage 3: group by checksum of the full content.
    fn crc_del_dups(
        &self,
        group: Vec<FileDescriptor>,
        state: &mut RunState,
    ) -> Result<(), DedupError> {
        let hasher = self.hasher;
        let keyed = keyed_par(&state.pool, group, |f: &FileDescriptor| {
            hasher.full(&f.real_path)
        })?;
        state.stats.full_hashed += keyed.len();

        for_each_keyed(keyed, |g| self.del_dups(g, state))
    }

    /// Stage 4: order by preference and pair candidates with partners.
    ///
    /// Single pass over a shrinking window `[0, hi)`. Candidate `i` is
    /// offered partners from `hi - 1` down to `i + 1`; the first confirmed
    /// pairing records the pair and moves `hi` down to the partner, so a
    /// kept file serves in one confirmed pairing and is never itself a
    /// candidate afterwards. Each pair is recorded as soon as it commits.
    fn del_dups(
        &self,
        mut group: Vec<FileDescriptor>,
        state: &mut RunState,
    ) -> Result<(), DedupError> {
        if self.options.is_shutdown_requested() {
            return Err(DedupError::Interrupted);
        }
        state.stats.candidate_groups += 1;
        order_by_decision(&mut group, &self.decision);

        let level = decision_level(self.options.verbose);
        let mut hi = group.len();
        let mut i = 0;

        while i < hi {
            for j in (i + 1..hi).rev() {
                if !(self.decision)(&group[i], &group[j]) {
                    continue;
                }

                state.stats.verifications += 1;
                let outcome = resolve_duplicate(
                    &group[i].real_path,
                    &group[j].real_path,
                    &self.delete_options,
                )?;
                if !outcome.is_duplicate() {
                    continue;
                }

                log::log!(
                    level,
                    "{}: {} (keeping {})",
                    outcome.label(),
                    group[i].display_path().display(),
                    group[j].display_path().display()
                );
                state.records.push(DeletionRecord {
                    deleted: group[i].clone(),
                    kept: group[j].clone(),
                    outcome,
                });
                hi = j;
                break;
            }
            i += 1;
        }

        Ok(())
    }
}

/// Stable insertion sort where `x` precedes `y` iff `decision(x, y)`.
///
/// `slice::sort_by` is not used because it needs a total order and may
/// panic when the comparator violates one; a caller-supplied decision
/// function carries no such guarantee. This costs O(n²) decision calls per
/// group and never panics.
fn order_by_decision<F>(group: &mut [FileDescriptor], decision: &F)
where
    F: Fn(&FileDescriptor, &FileDescriptor) -> bool,
{
    for k in 1..group.len() {
        let mut j = k;
        while j > 0 && decision(&group[j], &group[j - 1]) {
            group.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn count_size_groups(files: &[FileDescriptor]) -> usize {
    let mut sizes: HashMap<u64, usize> = HashMap::new();
    for file in files {
        *sizes.entry(file.size()).or_default() += 1;
    }
    sizes.values().filter(|&&n| n > 1).count()
}

/// Find and resolve duplicates under `roots`.
///
/// Shorthand for [`DuplicateFinder::run`] returning only the confirmed
/// pairs. Errors collected under `continue_on_error` are logged and
/// dropped; use [`DuplicateFinder`] to inspect them.
///
/// # Errors
///
/// See [`DuplicateFinder::run`].
pub fn deduplicate<F>(
    roots: &[PathBuf],
    decision: F,
    options: DedupOptions,
) -> Result<Vec<DeletionRecord>, DedupError>
where
    F: Fn(&FileDescriptor, &FileDescriptor) -> bool,
{
    let report = DuplicateFinder::new(options, decision).run(roots)?;
    for error in &report.errors {
        log::warn!("Skipped group: {}", error);
    }
    Ok(report.records)
}
