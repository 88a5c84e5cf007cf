//! Archive H1: validate a zip's structure, hash each entry, join into the
//! canonical line list.

use std::fs::File;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::h1::file::hash_reader;
use crate::h1::lines::hash_lines;
use crate::h1::path::validate_hash_path;

/// Maximum uncompressed size of a single archive entry: `100 MiB`, matching
/// the bound the native Go tooling imposes on module source files.
const MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// Compute the archive hash of `path`.
///
/// Rejects a non-empty archive-level comment, and, per entry: a non-empty
/// comment, a non-UTF-8 filename, an encrypted entry (the one general-
/// purpose flag bit that bears on content trust), an unsupported
/// compression method (anything but stored or deflated), non-empty extra-
/// field data, and an uncompressed size over [`MAX_ENTRY_SIZE`] — the same
/// structural constraints the upstream `dirhash.HashZip` enforces before it
/// will trust an archive's contents.
pub fn hash_zip(path: &Path) -> CoreResult<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| CoreError::State(format!("{}: invalid zip: {e}", path.display())))?;

    if !archive.comment().is_empty() {
        return Err(CoreError::State(format!(
            "{}: invalid zip comment",
            path.display()
        )));
    }

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    if names.is_empty() {
        return Err(CoreError::State(format!(
            "{}: archive contains no entries",
            path.display()
        )));
    }
    names.sort();

    let mut lines = Vec::with_capacity(names.len());
    for name in &names {
        let mut entry = archive
            .by_name(name)
            .map_err(|e| CoreError::State(format!("{}: {e}", path.display())))?;

        validate_hash_path(name)?;
        if !entry.comment().is_empty() {
            return Err(CoreError::State(format!(
                "{}: unexpected comment on entry {name}",
                path.display()
            )));
        }
        if std::str::from_utf8(entry.name_raw()).is_err() {
            return Err(CoreError::State(format!(
                "{}: non-UTF-8 filename in entry {name}",
                path.display()
            )));
        }
        if entry.is_encrypted() {
            return Err(CoreError::State(format!(
                "{}: unsupported flag bits on entry {name}",
                path.display()
            )));
        }
        match entry.compression() {
            zip::CompressionMethod::Stored | zip::CompressionMethod::Deflated => {}
            other => {
                return Err(CoreError::State(format!(
                    "{}: unsupported compression method {other:?} on entry {name}",
                    path.display()
                )));
            }
        }
        if !entry.extra_data().is_empty() {
            return Err(CoreError::State(format!(
                "{}: unexpected extra data in {name}",
                path.display()
            )));
        }
        if entry.size() > MAX_ENTRY_SIZE {
            return Err(CoreError::State(format!(
                "{}: entry {name} exceeds maximum size",
                path.display()
            )));
        }

        let cksum = hash_reader(&mut entry)?;
        lines.push(format!("{cksum}  {name}"));
    }

    hash_lines(&lines)
}
