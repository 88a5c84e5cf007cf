//! The canonical content-hash algorithm ("H1") for files, directory trees,
//! and archives, plus a descriptor (`go.mod`-equivalent) variant. `§4.A`.
//!
//! Every public entry point recomputes its result through
//! [`sanity`]'s independent second code path before returning, and turns any
//! disagreement into [`crate::error::CoreError::InternalBug`] — there is no
//! published Rust crate implementing this exact algorithm to call out to, so
//! this is the stand-in for "cross-check against an authoritative upstream
//! library".

mod descriptor;
mod dir;
mod file;
mod lines;
mod path;
mod sanity;
mod zip;

use std::path::Path;

pub use file::{hash_file, hash_reader};
pub use lines::hash_lines;
pub use path::validate_hash_path;

use crate::error::{CoreError, CoreResult};

/// Expected byte length of every H1 string: `h1:` plus the base64 of a
/// 32-byte SHA-256 digest.
pub const H1_LEN: usize = 47;

fn checked(primary: CoreResult<String>, sanity: CoreResult<String>, what: &str) -> CoreResult<String> {
    let primary = primary?;
    let sanity = sanity?;
    if primary.len() != H1_LEN {
        return Err(CoreError::InternalBug(format!(
            "{what}: primary hash is {} bytes, expected {H1_LEN}",
            primary.len()
        )));
    }
    if primary != sanity {
        return Err(CoreError::InternalBug(format!(
            "{what}: primary and sanity recomputation disagree: {primary} != {sanity}"
        )));
    }
    Ok(primary)
}

/// Compute the descriptor hash (`HashMod` in the original tooling) of a
/// `go.mod`-equivalent build-descriptor file.
pub fn hash_descriptor(path: &Path) -> CoreResult<String> {
    checked(
        descriptor::hash_descriptor(path),
        sanity::sanity_hash_mod(path),
        "hash_descriptor",
    )
}

/// Compute the directory hash (`HashDir`) of `dir`, treated as the
/// extracted contents of module `name` at `version`.
pub fn hash_dir(dir: &Path, name: &str, version: &str) -> CoreResult<String> {
    checked(
        dir::hash_dir(dir, name, version),
        sanity::sanity_hash_dir(dir, name, version),
        "hash_dir",
    )
}

/// Compute the archive hash (`HashZip`) of the zip file at `path`.
pub fn hash_zip(path: &Path) -> CoreResult<String> {
    checked(
        zip::hash_zip(path),
        sanity::sanity_hash_zip(path),
        "hash_zip",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn directory_hash_equals_zip_hash_for_same_tree() {
        let tree = tempfile::tempdir().unwrap();
        fs::write(tree.path().join("foo.txt"), b"hi\n").unwrap();
        fs::write(tree.path().join("bar.txt"), b"ok\n").unwrap();

        let dir_h1 = hash_dir(tree.path(), "example.com/x", "v0.0.1").unwrap();

        let zip_path = tree.path().join("../archive.zip");
        let file = fs::File::create(&zip_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in [
            ("example.com/x@v0.0.1/bar.txt", b"ok\n".as_slice()),
            ("example.com/x@v0.0.1/foo.txt", b"hi\n".as_slice()),
        ] {
            writer.start_file(name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();

        let zip_h1 = hash_zip(&zip_path).unwrap();
        assert_eq!(dir_h1, zip_h1);
    }

    #[test]
    fn descriptor_hash_is_47_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, b"module example.com/x\n").unwrap();
        assert_eq!(hash_descriptor(&path).unwrap().len(), H1_LEN);
    }
}
