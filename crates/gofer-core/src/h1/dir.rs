//! Directory-tree H1: walk, validate, hash each file, join into the
//! canonical line list.

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::h1::file::hash_file;
use crate::h1::lines::hash_lines;
use crate::h1::path::validate_hash_path;

struct Entry {
    disk_path: std::path::PathBuf,
    hash_path: String,
}

/// Compute the directory hash of `dir`, treated as the extracted contents
/// of module `name` at `version`.
///
/// Walks the tree, rejects any entry that is not a plain file (symlinks,
/// sockets, etc.), forbids directories that contain no hashed file (they're
/// invisible to the upstream algorithm and therefore a sign of a
/// misconstructed tree), sorts by on-disk path, and hashes each file's bytes
/// under a synthesised `name@version/relative/path` hash-path.
pub fn hash_dir(dir: &Path, name: &str, version: &str) -> CoreResult<String> {
    let meta = std::fs::metadata(dir)?;
    if !meta.is_dir() {
        return Err(CoreError::State(format!("{} must be a directory", dir.display())));
    }

    let entries = collect_entries(dir, name, version)?;

    let mut lines = Vec::with_capacity(entries.len());
    for entry in &entries {
        let cksum = hash_file(&entry.disk_path)?;
        lines.push(format!("{cksum}  {}", entry.hash_path));
    }

    hash_lines(&lines)
}

fn collect_entries(dir: &Path, name: &str, version: &str) -> CoreResult<Vec<Entry>> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in walkdir::WalkDir::new(dir).into_iter() {
        let entry = entry.map_err(|e| CoreError::Io(std::io::Error::other(e)))?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            dirs.push(entry.path().to_path_buf());
            continue;
        }
        if !file_type.is_file() {
            return Err(CoreError::State(format!(
                "unsupported file type for {}",
                entry.path().display()
            )));
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .expect("walkdir yields paths under dir");
        let hash_path = validate_hash_path(&format!(
            "{name}@{version}/{}",
            relative.to_string_lossy().replace('\\', "/")
        ))?;
        files.push(Entry {
            disk_path: entry.path().to_path_buf(),
            hash_path,
        });
    }

    for d in &dirs {
        let used = files.iter().any(|f| f.disk_path.starts_with(d));
        if !used {
            return Err(CoreError::State(format!(
                "invalid subdir with no hashed file beneath it: {}",
                d.display()
            )));
        }
    }

    if files.is_empty() {
        return Err(CoreError::State("directory contains no files".into()));
    }

    files.sort_by(|a, b| a.disk_path.cmp(&b.disk_path));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hashes_a_small_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.txt"), b"hi\n").unwrap();
        fs::write(dir.path().join("bar.txt"), b"ok\n").unwrap();

        let h1 = hash_dir(dir.path(), "example.com/x", "v0.0.1").unwrap();
        assert_eq!(h1.len(), 47);
        assert!(h1.starts_with("h1:"));
    }

    #[test]
    fn rejects_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(hash_dir(dir.path(), "example.com/x", "v0.0.1").is_err());
    }

    #[test]
    fn is_order_independent_of_creation_order() {
        let a = tempfile::tempdir().unwrap();
        fs::write(a.path().join("a.txt"), b"1\n").unwrap();
        fs::write(a.path().join("b.txt"), b"2\n").unwrap();

        let b = tempfile::tempdir().unwrap();
        fs::write(b.path().join("b.txt"), b"2\n").unwrap();
        fs::write(b.path().join("a.txt"), b"1\n").unwrap();

        assert_eq!(
            hash_dir(a.path(), "example.com/x", "v0.0.1").unwrap(),
            hash_dir(b.path(), "example.com/x", "v0.0.1").unwrap()
        );
    }
}
