//! Descriptor (`go.mod`-equivalent) H1: a single-line hash of one file.

use std::path::Path;

use crate::error::CoreResult;
use crate::h1::file::hash_file;
use crate::h1::lines::hash_lines;

/// Compute the descriptor hash of `path`: `"<hex-sha256>  go.mod"`, joined
/// through [`hash_lines`] like every other H1 variant.
pub fn hash_descriptor(path: &Path) -> CoreResult<String> {
    let cksum = hash_file(path)?;
    hash_lines(&[format!("{cksum}  go.mod")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hashes_a_descriptor_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, b"module example.com/x\n\ngo 1.21\n").unwrap();

        let h1 = hash_descriptor(&path).unwrap();
        assert_eq!(h1.len(), 47);
        assert!(h1.starts_with("h1:"));
    }
}
