//! Streaming byte-exact file comparison.
//!
//! This is the only proof of equality the crate accepts. Checksums upstream
//! only partition candidates; every deletion is preceded by a call to
//! [`identical_files`] (or a proven hard link).

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use super::identity::same_file;
use crate::error::DedupError;

/// Default comparison and partial-hash chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Compare two files byte for byte.
///
/// Files of different sizes are reported unequal without being opened.
/// Otherwise both files are read in lock-step through two `chunk_size`
/// buffers; the first differing chunk ends the comparison. At most
/// `2 * chunk_size` bytes are held in memory regardless of file size.
///
/// # Errors
///
/// - `InvalidArgument` if `a` and `b` are the same directory entry, or
///   `chunk_size` is zero
/// - I/O errors from stat, open or read
///
/// # Example
///
/// ```no_run
/// use rustdedup::scanner::{identical_files, DEFAULT_CHUNK_SIZE};
/// use std::path::Path;
///
/// let equal = identical_files(Path::new("a.bin"), Path::new("b.bin"), DEFAULT_CHUNK_SIZE)?;
/// # Ok::<(), rustdedup::DedupError>(())
/// ```
pub fn identical_files(a: &Path, b: &Path, chunk_size: usize) -> Result<bool, DedupError> {
    if same_file(a, b) {
        return Err(DedupError::InvalidArgument(format!(
            "refusing to compare {} with itself",
            a.display()
        )));
    }
    if chunk_size == 0 {
        return Err(DedupError::InvalidArgument(
            "comparison chunk size must be positive".to_string(),
        ));
    }

    let size_a = fs::metadata(a).map_err(|e| DedupError::io(a, e))?.len();
    let size_b = fs::metadata(b).map_err(|e| DedupError::io(b, e))?.len();
    if size_a != size_b {
        log::trace!(
            "Size mismatch ({} vs {}): {} / {}",
            size_a,
            size_b,
            a.display(),
            b.display()
        );
        return Ok(false);
    }

    let mut file_a = File::open(a).map_err(|e| DedupError::io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| DedupError::io(b, e))?;

    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let n_a = fill(&mut file_a, &mut buf_a).map_err(|e| DedupError::io(a, e))?;
        let n_b = fill(&mut file_b, &mut buf_b).map_err(|e| DedupError::io(b, e))?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_identical_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"same bytes");
        let b = write_file(&dir, "b", b"same bytes");

        assert!(identical_files(&a, &b, DEFAULT_CHUNK_SIZE).unwrap());
    }

    #[test]
    fn test_different_sizes() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"short");
        let b = write_file(&dir, "b", b"much longer");

        assert!(!identical_files(&a, &b, DEFAULT_CHUNK_SIZE).unwrap());
    }

    #[test]
    fn test_same_size_different_content() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"abcdef");
        let b = write_file(&dir, "b", b"abcdeg");

        assert!(!identical_files(&a, &b, DEFAULT_CHUNK_SIZE).unwrap());
    }

    #[test]
    fn test_small_chunks_span_many_reads() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut altered = content.clone();
        altered[9_999] ^= 0xFF;

        let a = write_file(&dir, "a", &content);
        let b = write_file(&dir, "b", &content);
        let c = write_file(&dir, "c", &altered);

        assert!(identical_files(&a, &b, 7).unwrap());
        assert!(!identical_files(&a, &c, 7).unwrap());
    }

    #[test]
    fn test_empty_files_identical() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"");
        let b = write_file(&dir, "b", b"");

        assert!(identical_files(&a, &b, DEFAULT_CHUNK_SIZE).unwrap());
    }

    #[test]
    fn test_self_comparison_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"content");

        let result = identical_files(&a, &a, DEFAULT_CHUNK_SIZE);
        assert!(matches!(result, Err(DedupError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"content");
        let b = write_file(&dir, "b", b"content");

        let result = identical_files(&a, &b, 0);
        assert!(matches!(result, Err(DedupError::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a", b"content");
        let missing = dir.path().join("missing");

        let result = identical_files(&a, &missing, DEFAULT_CHUNK_SIZE);
        assert!(matches!(result, Err(DedupError::NotFound(_))));
    }
}
