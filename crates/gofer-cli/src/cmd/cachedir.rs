//! `gofer cachedir` -- `§4.G`, mint a pseudo-versioned cache entry from a
//! local git working tree.

use std::path::Path;

use anyhow::Result;
use gofer_core::mint;

/// Mint a cache entry for the working tree at `tree`, installing it under
/// the native-cache root `out`, and print the two manifest lines the caller
/// should record.
///
/// # Errors
///
/// Returns an error if `tree` is not a git working tree, its `HEAD` does
/// not resolve to a commit, or its descriptor file is missing or malformed.
pub fn run(tree: &Path, out: &Path) -> Result<()> {
    let result = mint::cache_dir(tree, out)?;

    println!(
        "{} {} {}",
        result.name.as_str(),
        result.version.as_str(),
        result.archive_hash.as_str()
    );
    println!(
        "{} {}/go.mod {}",
        result.name.as_str(),
        result.version.as_str(),
        result.descriptor_hash.as_str()
    );
    Ok(())
}
