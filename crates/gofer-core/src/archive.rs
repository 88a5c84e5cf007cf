//! Canonical archive creation: package a directory tree into the same zip
//! shape [`crate::h1::hash_zip`] expects, so an archive produced here always
//! verifies against the directory hash of the same tree (`§4.A`, `§4.G`).

use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::h1::validate_hash_path;

/// Write a deterministic zip archive of `dir` (treated as module
/// `name@version`) to `sink`: entries stored (not deflated), sorted by
/// hash-path, with empty comments and no extra fields, matching every
/// constraint [`crate::h1::hash_zip`] enforces on read.
pub fn create_archive_from_dir(
    dir: &Path,
    name: &str,
    version: &str,
    sink: impl Write + Seek,
) -> CoreResult<()> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .expect("walkdir yields paths under dir")
            .to_string_lossy()
            .replace('\\', "/");
        let hash_path = validate_hash_path(&format!("{name}@{version}/{relative}"))?;
        entries.push((hash_path, entry.path().to_path_buf()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    if entries.is_empty() {
        return Err(CoreError::State(format!(
            "{}: no files to archive",
            dir.display()
        )));
    }

    let mut writer = zip::ZipWriter::new(sink);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (hash_path, disk_path) in entries {
        writer
            .start_file(&hash_path, options)
            .map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
        let data = std::fs::read(&disk_path)?;
        writer.write_all(&data)?;
    }
    writer
        .finish()
        .map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h1::hash_dir;
    use std::fs;
    use std::io::Cursor;

    #[test]
    fn created_archive_hashes_equal_to_source_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), b"hi\n").unwrap();
        fs::write(dir.path().join("bar.txt"), b"ok\n").unwrap();

        let mut buf = Cursor::new(Vec::new());
        create_archive_from_dir(dir.path(), "example.com/x", "v0.0.1", &mut buf).unwrap();

        let archive_path = dir.path().join("../out.zip");
        fs::write(&archive_path, buf.into_inner()).unwrap();

        let dir_h1 = hash_dir(dir.path(), "example.com/x", "v0.0.1").unwrap();
        let zip_h1 = crate::h1::hash_zip(&archive_path).unwrap();
        assert_eq!(dir_h1, zip_h1);
    }
}
