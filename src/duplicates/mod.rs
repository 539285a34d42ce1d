//! Duplicate detection and resolution.
//!
//! - [`groups`]: the generic partition-by-key combinator every stage uses
//! - [`finder`]: the size → partial checksum → full checksum → pairing
//!   pipeline and the [`deduplicate`] entry point
//! - [`policy`]: ready-made decision functions

pub mod finder;
pub mod groups;
pub mod policy;

pub use finder::{deduplicate, DedupReport, DeletionRecord, DuplicateFinder, PipelineStats};
pub use groups::{for_each_dup, for_each_keyed, keyed_par, process_dups, process_keyed};
pub use policy::{Decision, KeepPolicy};
