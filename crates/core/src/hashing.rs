//! Content fingerprints for source files.
//!
//! A fingerprint identifies a batch together with its source path. Files
//! are streamed in fixed-size chunks and never buffered whole.

use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::source::{LocalFs, SourceFs};
use crate::types::FileHash;

/// Bytes read per chunk while hashing.
pub const HASH_CHUNK_SIZE: usize = 4096;

/// Hex-encoded SHA-256 of everything `reader` yields.
pub fn hash_reader<R: Read>(mut reader: R) -> io::Result<FileHash> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; HASH_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Fingerprint the file at `path` on the local disk.
pub fn hash_file(path: &Path) -> FileHash {
    hash_source(&LocalFs, path)
}

/// Fingerprint `path` as seen through `fs`.
///
/// An unreadable file yields the empty sentinel instead of an error, so
/// the caller sees a fingerprint mismatch and reloads rather than aborting.
pub fn hash_source(fs: &dyn SourceFs, path: &Path) -> FileHash {
    match fs.open(path).and_then(hash_reader) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to fingerprint file");
            FileHash::new()
        }
    }
}

/// Whether a freshly computed fingerprint proves the stored batch is current.
///
/// The empty sentinel never matches, not even another empty value.
pub fn is_unchanged(current: &str, prior: Option<&str>) -> bool {
    !current.is_empty() && prior == Some(current)
}
