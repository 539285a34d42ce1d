//! Ready-made decision functions.
//!
//! A decision function answers one question: "should `x` be deleted in
//! favor of `y`?" It must be a strict ordering, so for any pair at most one
//! direction returns `true`. Every policy here returns `false` both ways on
//! a tie. A decision never authorizes a deletion by itself; the deletion
//! primitive still proves duplication first.

use std::fs;
use std::path::PathBuf;

use crate::scanner::FileDescriptor;

/// Boxed decision function, for policies chosen at runtime.
pub type Decision = Box<dyn Fn(&FileDescriptor, &FileDescriptor) -> bool + Send + Sync>;

/// Built-in keep policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepPolicy {
    /// Keep copies under earlier search roots.
    #[default]
    FirstRoot,
    /// Keep the copy with the shortest resolved path.
    ShortestPath,
    /// Keep the least recently modified copy.
    Oldest,
    /// Keep the most recently modified copy.
    Newest,
}

impl KeepPolicy {
    /// Build the decision function for this policy.
    ///
    /// `roots` is only consulted by [`KeepPolicy::FirstRoot`].
    #[must_use]
    pub fn decision(self, roots: &[PathBuf]) -> Decision {
        match self {
            Self::FirstRoot => Box::new(prefer_roots(roots)),
            Self::ShortestPath => Box::new(keep_shortest_path),
            Self::Oldest => Box::new(keep_oldest),
            Self::Newest => Box::new(keep_newest),
        }
    }
}

/// Delete copies under later roots in favor of copies under earlier ones.
///
/// A file's rank is the index of the first root containing its resolved
/// path; files outside every root rank last.
pub fn prefer_roots(
    roots: &[PathBuf],
) -> impl Fn(&FileDescriptor, &FileDescriptor) -> bool + Send + Sync {
    let resolved: Vec<PathBuf> = roots
        .iter()
        .map(|r| fs::canonicalize(r).unwrap_or_else(|_| r.clone()))
        .collect();

    move |x, y| root_rank(&resolved, x) > root_rank(&resolved, y)
}

fn root_rank(roots: &[PathBuf], file: &FileDescriptor) -> usize {
    roots
        .iter()
        .position(|root| file.real_path.starts_with(root))
        .unwrap_or(usize::MAX)
}

/// Delete the copy with the longer resolved path.
pub fn keep_shortest_path(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    x.real_path.as_os_str().len() > y.real_path.as_os_str().len()
}

/// Delete the more recently modified copy. Unknown times never decide.
pub fn keep_oldest(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    matches!(
        (x.metadata.modified, y.metadata.modified),
        (Some(mx), Some(my)) if mx > my
    )
}

/// Delete the less recently modified copy. Unknown times never decide.
pub fn keep_newest(x: &FileDescriptor, y: &FileDescriptor) -> bool {
    matches!(
        (x.metadata.modified, y.metadata.modified),
        (Some(mx), Some(my)) if mx < my
    )
}
