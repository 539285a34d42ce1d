//! File actions.
//!
//! Currently a single action: verified deletion of a duplicate, optionally
//! leaving a symbolic or hard link in its place. See [`delete`].

pub mod delete;

pub use delete::{
    delete_duplicate_file, resolve_duplicate, DeleteOptions, DeleteOutcome, ReplaceWith,
};
