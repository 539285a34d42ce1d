//! Identity and aliasing checks.
//!
//! Two questions are answered here, always against the live filesystem:
//!
//! - [`same_file`]: do two paths name the *same directory entry*? Overlapping
//!   search roots joined by symlinked directories make this common, and a
//!   file must never be compared with or deleted in favor of itself.
//! - [`is_hardlink`]: do two paths name *different entries for one inode*?
//!   Deleting one of them frees no space.
//!
//! # Platform Support
//!
//! - **Unix**: (device_id, inode) pairs from file metadata
//! - **Other**: directories are compared by canonical path; hard link
//!   detection is disabled and always reports `false`

use std::fs;
use std::path::{Path, PathBuf};

use super::path_utils::paths_equal_normalized;
use crate::error::DedupError;

/// Platform-specific identity of a resolved filesystem object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ObjectKey {
    #[cfg(unix)]
    Inode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl ObjectKey {
    /// Resolve `path` (following every symlink) to its identity.
    fn resolve(path: &Path) -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let meta = fs::metadata(path)?;
            Ok(Self::Inode {
                dev: meta.dev(),
                ino: meta.ino(),
            })
        }
        #[cfg(not(unix))]
        {
            fs::canonicalize(path).map(Self::Canonical)
        }
    }
}

/// Directory component of `path`, with `.` standing in for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Check whether `a` and `b` denote the same directory entry.
///
/// True iff both have the same file name and their containing directories
/// resolve, after following all symlinks, to the same object, or are
/// textually identical after normalization. Symlinks in the final
/// component are *not* followed: a link and its target are different
/// entries.
///
/// Reflexive and symmetric. Never fails; a directory that cannot be
/// resolved falls back to the textual comparison.
///
/// # Example
///
/// ```
/// use rustdedup::scanner::same_file;
/// use std::path::Path;
///
/// assert!(same_file(Path::new("/tmp/x/a.txt"), Path::new("/tmp/x/./a.txt")));
/// assert!(!same_file(Path::new("/tmp/x/a.txt"), Path::new("/tmp/x/b.txt")));
/// ```
#[must_use]
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (name_a, name_b) = match (a.file_name(), b.file_name()) {
        (Some(na), Some(nb)) => (na, nb),
        _ => return paths_equal_normalized(&absolute(a), &absolute(b)),
    };
    if name_a != name_b {
        return false;
    }

    let dir_a = parent_dir(a);
    let dir_b = parent_dir(b);

    if let (Ok(ka), Ok(kb)) = (ObjectKey::resolve(&dir_a), ObjectKey::resolve(&dir_b)) {
        if ka == kb {
            return true;
        }
    }

    paths_equal_normalized(&absolute(&dir_a), &absolute(&dir_b))
}

/// Check whether `a` and `b` are two names for one inode.
///
/// Both paths are stat'ed following symlinks, so callers should pass
/// already-resolved paths. Always `false` on platforms without inode
/// numbers.
///
/// # Errors
///
/// Returns an error if either path cannot be stat'ed.
pub fn is_hardlink(a: &Path, b: &Path) -> Result<bool, DedupError> {
    #[cfg(unix)]
    {
        let ka = ObjectKey::resolve(a).map_err(|e| DedupError::io(a, e))?;
        let kb = ObjectKey::resolve(b).map_err(|e| DedupError::io(b, e))?;
        Ok(ka == kb)
    }
    #[cfg(not(unix))]
    {
        fs::metadata(a).map_err(|e| DedupError::io(a, e))?;
        fs::metadata(b).map_err(|e| DedupError::io(b, e))?;
        Ok(false)
    }
}

/// Check whether `a` and `b` live on the same device.
///
/// Used before hard link replacement. Always `true` on platforms without
/// device ids; the link call itself reports the failure there.
///
/// # Errors
///
/// Returns an error if either path cannot be stat'ed.
pub fn same_device(a: &Path, b: &Path) -> Result<bool, DedupError> {
    let meta_a = fs::metadata(a).map_err(|e| DedupError::io(a, e))?;
    let meta_b = fs::metadata(b).map_err(|e| DedupError::io(b, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        Ok(meta_a.dev() == meta_b.dev())
    }
    #[cfg(not(unix))]
    {
        let _ = (meta_a, meta_b);
        Ok(true)
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
