//! Local-cache minting: turn a checked-out working tree into a cache entry
//! consumable by `§4.E`'s verification path (`§4.G`).
//!
//! This is the one place the core touches a version-control system
//! directly; everywhere else it only ever sees a manifest and files already
//! materialised on disk.

use std::fs;
use std::path::Path;

use gofer_schema::{Checksum, ModuleName, ModuleVersion};

use crate::archive;
use crate::artifact::{DescriptorKind, Identity, SourceKind};
use crate::error::{CoreError, CoreResult};
use crate::h1;
use crate::parse;

/// The two hashes and module coordinates a minted cache entry produces,
/// which the caller records as two lines of a manifest.
#[derive(Debug, Clone)]
pub struct MintResult {
    /// The module path read from the working tree's descriptor file.
    pub name: ModuleName,
    /// The synthesised pseudo-version.
    pub version: ModuleVersion,
    /// The archive hash (`HashZip` of the minted `.zip`).
    pub archive_hash: Checksum,
    /// The descriptor hash (`HashMod` of the working tree's descriptor).
    pub descriptor_hash: Checksum,
}

/// Format a git commit time (UTC epoch seconds) as
/// `YYYYMMDDHHMMSS`, the digit run `§4.G` step 3 embeds in the
/// pseudo-version.
fn format_pseudo_timestamp(epoch_seconds: i64) -> CoreResult<String> {
    let dt = chrono::DateTime::<chrono::Utc>::from_timestamp(epoch_seconds, 0)
        .ok_or_else(|| CoreError::State(format!("invalid commit timestamp {epoch_seconds}")))?;
    Ok(dt.format("%Y%m%d%H%M%S").to_string())
}

/// Read the working tree's `HEAD` commit hash and committer timestamp.
fn head_commit_info(tree: &Path) -> CoreResult<(String, i64)> {
    let repo = git2::Repository::open(tree)
        .map_err(|e| CoreError::State(format!("{}: not a git working tree: {e}", tree.display())))?;
    let head = repo
        .head()
        .map_err(|e| CoreError::State(format!("{}: no HEAD: {e}", tree.display())))?;
    let commit = head
        .peel_to_commit()
        .map_err(|e| CoreError::State(format!("{}: HEAD does not resolve to a commit: {e}", tree.display())))?;

    let sha = commit.id().to_string();
    let seconds = commit.time().seconds();
    Ok((sha, seconds))
}

/// Clone `tree` into a fresh throwaway directory and strip its `.git`
/// metadata, yielding a tree containing exactly the committed files —
/// `§4.G` step 4's "clean tree".
fn clean_checkout(tree: &Path, dest: &Path) -> CoreResult<()> {
    let url = tree
        .to_str()
        .ok_or_else(|| CoreError::State(format!("{}: path is not valid UTF-8", tree.display())))?;
    git2::Repository::clone(url, dest)
        .map_err(|e| CoreError::State(format!("cloning {}: {e}", tree.display())))?;
    let git_dir = dest.join(".git");
    if git_dir.exists() {
        fs::remove_dir_all(&git_dir)?;
    }
    Ok(())
}

/// `§4.G`: mint a pseudo-versioned cache entry for the working tree at
/// `tree`, installing it under the native cache root `out`.
///
/// # Errors
///
/// Returns [`CoreError::State`] if `tree` is not a git working tree or its
/// `HEAD` does not resolve to a commit, or if the descriptor file is
/// missing or malformed; propagates [`CoreError::Io`] for any filesystem
/// failure along the way.
pub fn cache_dir(tree: &Path, out: &Path) -> CoreResult<MintResult> {
    let descriptor_path = tree.join("go.mod");
    let descriptor_text = fs::read_to_string(&descriptor_path)?;
    let descriptor = parse::parse_descriptor(&descriptor_text)?;

    let (sha, seconds) = head_commit_info(tree)?;
    let timestamp = format_pseudo_timestamp(seconds)?;
    let short_sha = &sha[..12.min(sha.len())];
    let pseudo_version = ModuleVersion::new(format!("v0.0.0-{timestamp}-{short_sha}"))?;

    let checkout = tempfile::tempdir()?;
    let clean_tree = checkout.path().join("tree");
    clean_checkout(tree, &clean_tree)?;

    let archive_dir = tempfile::tempdir()?;
    let archive_path = archive_dir.path().join("module.zip");
    let archive_file = fs::File::create(&archive_path)?;
    archive::create_archive_from_dir(
        &clean_tree,
        descriptor.module.as_str(),
        pseudo_version.as_str(),
        archive_file,
    )?;

    let archive_hash = Checksum::parse(h1::hash_zip(&archive_path)?)?;
    let descriptor_hash = Checksum::parse(h1::hash_descriptor(&descriptor_path)?)?;

    let source_identity: Identity<SourceKind> = Identity::hashed(
        descriptor.module.clone(),
        pseudo_version.clone(),
        archive_hash.clone(),
    );
    let descriptor_identity: Identity<DescriptorKind> = Identity::hashed(
        descriptor.module.clone(),
        pseudo_version.clone(),
        descriptor_hash.clone(),
    );

    let native_zip = source_identity.native_path(out);
    if let Some(parent) = native_zip.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&archive_path, &native_zip)?;
    fs::write(source_identity.ziphash_path(out), archive_hash.as_str())?;
    fs::copy(&descriptor_path, descriptor_identity.native_path(out))?;

    Ok(MintResult {
        name: descriptor.module,
        version: pseudo_version,
        archive_hash,
        descriptor_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn init_repo(dir: &Path) -> git2::Repository {
        let repo = git2::Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        repo
    }

    fn commit_all(repo: &git2::Repository, message: &str) -> git2::Oid {
        let mut index = repo.index().unwrap();
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = repo.signature().unwrap();

        let parents: Vec<git2::Commit> = match repo.head().and_then(|h| h.peel_to_commit()) {
            Ok(c) => vec![c],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn pseudo_timestamp_matches_the_canonical_example() {
        // 2023-05-04 10:20:30 UTC, `§8` scenario 6.
        let epoch = chrono::Utc.with_ymd_and_hms(2023, 5, 4, 10, 20, 30).unwrap().timestamp();
        assert_eq!(format_pseudo_timestamp(epoch).unwrap(), "20230504102030");
    }

    #[test]
    fn mints_a_pseudo_versioned_entry() {
        let tree = tempfile::tempdir().unwrap();
        let repo = init_repo(tree.path());
        fs::write(tree.path().join("go.mod"), "module example.com/x\n").unwrap();
        fs::write(tree.path().join("main.go"), "package main\n").unwrap();
        commit_all(&repo, "initial");

        let out = tempfile::tempdir().unwrap();
        let result = cache_dir(tree.path(), out.path()).unwrap();

        assert_eq!(result.name.as_str(), "example.com/x");
        assert!(result.version.as_str().starts_with("v0.0.0-"));
        assert_eq!(result.archive_hash.as_str().len(), 47);
        assert_eq!(result.descriptor_hash.as_str().len(), 47);

        let identity: Identity<SourceKind> =
            Identity::hashed(result.name.clone(), result.version.clone(), result.archive_hash.clone());
        assert!(identity.native_path(out.path()).exists());
        assert!(identity.ziphash_path(out.path()).exists());
    }
}
