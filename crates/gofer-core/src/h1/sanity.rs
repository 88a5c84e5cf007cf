//! An independent, structurally different recomputation of each H1 variant,
//! used only to sanity-check the primary implementation (`§4.A`).
//!
//! There is no published Rust crate implementing this exact Go-module H1
//! algorithm to cross-check against, so this module stands in for that
//! upstream library: it computes the same three hashes via code paths that
//! deliberately differ in shape from [`super::file`], [`super::dir`], and
//! [`super::zip`], so a bug shared by "the" implementation is less likely to
//! also be present, unnoticed, in the check.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// Streaming per-file hash: the primary path ([`super::file::hash_file`])
/// reads the whole file into memory first. This reads in fixed-size chunks
/// through a `BufReader` instead.
fn streaming_hash_file(path: &Path) -> CoreResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn finish(lines: &[String]) -> CoreResult<String> {
    let mut joined = lines.join("\n");
    joined.push('\n');
    let h1 = format!("h1:{}", BASE64.encode(Sha256::digest(joined.as_bytes())));
    if h1.len() != 47 {
        return Err(CoreError::InternalBug(format!(
            "sanity recomputation produced {} bytes, expected 47",
            h1.len()
        )));
    }
    Ok(h1)
}

/// Independent recomputation of [`super::descriptor::hash_descriptor`].
pub(super) fn sanity_hash_mod(path: &Path) -> CoreResult<String> {
    let cksum = streaming_hash_file(path)?;
    finish(&[format!("{cksum}  go.mod")])
}

/// Independent recomputation of [`super::dir::hash_dir`], reusing
/// [`super::path::validate_hash_path`] (the path alphabet itself isn't the
/// thing under test) but re-walking the tree with direct recursion rather
/// than `walkdir`.
pub(super) fn sanity_hash_dir(dir: &Path, name: &str, version: &str) -> CoreResult<String> {
    let mut files = Vec::new();
    walk_recursive(dir, dir, &mut files)?;
    if files.is_empty() {
        return Err(CoreError::State("directory contains no files".into()));
    }
    files.sort();

    let mut lines = Vec::with_capacity(files.len());
    for relative in &files {
        let disk_path = dir.join(relative);
        let cksum = streaming_hash_file(&disk_path)?;
        let hash_path = super::path::validate_hash_path(&format!(
            "{name}@{version}/{}",
            relative.to_string_lossy().replace('\\', "/")
        ))?;
        lines.push(format!("{cksum}  {hash_path}"));
    }
    finish(&lines)
}

fn walk_recursive(
    root: &Path,
    current: &Path,
    out: &mut Vec<std::path::PathBuf>,
) -> CoreResult<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk_recursive(root, &path, out)?;
        } else {
            out.push(
                path.strip_prefix(root)
                    .expect("entry is under root")
                    .to_path_buf(),
            );
        }
    }
    Ok(())
}

/// Independent recomputation of [`super::zip::hash_zip`]: reads each entry
/// fully into a buffer (read-then-hash) where the primary path streams
/// bytes through [`super::file::hash_reader`] instead.
pub(super) fn sanity_hash_zip(path: &Path) -> CoreResult<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| CoreError::State(format!("{}: invalid zip: {e}", path.display())))?;

    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();

    let mut lines = Vec::with_capacity(names.len());
    for name in &names {
        let mut entry = archive
            .by_name(name)
            .map_err(|e| CoreError::State(format!("{}: {e}", path.display())))?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        let cksum = hex::encode(Sha256::digest(&buf));
        lines.push(format!("{cksum}  {name}"));
    }
    finish(&lines)
}
