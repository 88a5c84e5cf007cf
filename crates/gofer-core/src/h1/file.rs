//! Plain SHA-256 of a single file's bytes, the per-entry primitive every H1
//! variant builds its line list from.

use std::fs;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CoreResult;

/// Hex-encoded SHA-256 of `path`'s contents.
pub fn hash_file(path: &Path) -> CoreResult<String> {
    let data = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}

/// Hex-encoded SHA-256 of a reader's contents, streamed rather than
/// buffered whole. Used by the primary code path for archive entries; kept
/// deliberately distinct from [`hash_file`]'s read-then-hash shape so the
/// sanity check in [`super::sanity_hash_bytes`] exercises a structurally
/// different implementation.
pub fn hash_reader(mut reader: impl Read) -> CoreResult<String> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn file_and_reader_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"hello\n").unwrap();

        let from_file = hash_file(&path).unwrap();
        let from_reader = hash_reader(Cursor::new(b"hello\n")).unwrap();
        assert_eq!(from_file, from_reader);
    }
}
