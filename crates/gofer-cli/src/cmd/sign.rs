//! `gofer sign` -- `§4.F2`, verify the native cache then sign into the
//! signature store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use gofer_core::reconcile;
use gofer_core::reporter::Reporter;

use crate::config::Config;

/// Verify every artifact implied by `manifests` against the native cache,
/// then sign each into the signature store with this process's configured
/// signing identity.
///
/// # Errors
///
/// Returns an error if the configured keyring has no signing identity, or
/// if any artifact fails verification.
pub fn run(config: &Config, reporter: Arc<dyn Reporter>, manifests: &[PathBuf]) -> Result<()> {
    let entries = gofer_core::parse::read_manifests(manifests)?;
    let ctx = crate::context::build(config)?;

    if ctx.keyring.identity().is_none() {
        anyhow::bail!(
            "no signing identity configured in {} -- run `gofer keygen` and add it to the keyring",
            config.keyring_path.display()
        );
    }

    let signed = reconcile::verify_and_sign(&ctx, reporter.as_ref(), &entries)?;
    println!(
        "signed {} artifacts ({} source, {} descriptor, {} metadata)",
        signed.total(),
        signed.source,
        signed.descriptor,
        signed.metadata
    );
    Ok(())
}
