//! `gofer get` -- `§4.F3`, the concurrent download/verify/install protocol.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use gofer_core::reconcile;
use gofer_core::reporter::Reporter;

use crate::config::Config;

/// Download, verify, and install every artifact implied by `manifests`,
/// fetching from `config.mirror_base_url` at a concurrency ceiling fixed by
/// configuration (`§5`).
///
/// # Errors
///
/// Returns an error if a manifest is malformed or missing, or if any
/// Source or Descriptor artifact fails to download or verify (a missing
/// Metadata artifact is tolerated and only logged).
pub async fn run(config: &Config, reporter: Arc<dyn Reporter>, manifests: &[PathBuf]) -> Result<()> {
    let entries = gofer_core::parse::read_manifests(manifests)?;
    let ctx = crate::context::build(config)?;

    reconcile::download_and_verify(&ctx, reporter, &entries, &config.mirror_base_url).await?;
    println!("fetched and verified {} manifest entries", entries.len());
    Ok(())
}
