//! Textual path normalization.
//!
//! Used as the fallback identity check when a directory cannot be resolved
//! on disk: two spellings of the same directory compare equal after
//! lexical cleanup and Unicode NFC normalization.
//!
//! # Background
//!
//! macOS stores file names in NFD (decomposed) form while Linux and Windows
//! typically use NFC (composed), so the same visual name can have different
//! byte representations:
//!
//! - NFC: `café` - 'é' is U+00E9
//! - NFD: `café` - 'e' U+0065 + combining acute accent U+0301
//!
//! # Example
//!
//! ```
//! use rustdedup::scanner::path_utils::paths_equal_normalized;
//! use std::path::Path;
//!
//! assert!(paths_equal_normalized(
//!     Path::new("/data/./cafe\u{0301}/"),
//!     Path::new("/data/café"),
//! ));
//! ```

use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Lexically clean a path without touching the filesystem.
///
/// Drops `.` components and resolves `..` against the preceding normal
/// component. A `..` that would climb above the root is dropped; a leading
/// `..` in a relative path is kept.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Lexical cleanup followed by NFC normalization.
///
/// Paths that are not valid UTF-8 are only cleaned lexically.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let cleaned = lexical_normalize(path);
    match cleaned.to_str() {
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => cleaned,
    }
}

/// Check if two paths are textually identical after normalization.
#[must_use]
pub fn paths_equal_normalized(a: &Path, b: &Path) -> bool {
    normalize_path(a) == normalize_path(b)
}
