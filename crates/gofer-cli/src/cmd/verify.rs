//! `gofer verify` -- `§4.F1`, entirely offline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use gofer_core::reconcile;
use gofer_core::reporter::Reporter;

use crate::config::Config;

/// Verify every artifact implied by `manifests` against the signature store
/// and native cache, reporting progress through `reporter`.
///
/// # Errors
///
/// Returns an error if a manifest is malformed or missing, or if any
/// artifact fails verification.
pub fn run(config: &Config, reporter: Arc<dyn Reporter>, manifests: &[PathBuf]) -> Result<()> {
    let entries = gofer_core::parse::read_manifests(manifests)?;
    let ctx = crate::context::build(config)?;

    let report = reconcile::verify(&ctx, reporter.as_ref(), &entries)?;

    println!(
        "signed: {} source, {} descriptor, {} metadata",
        report.signed.source, report.signed.descriptor, report.signed.metadata
    );
    println!(
        "native: {} source, {} descriptor, {} metadata",
        report.native.source, report.native.descriptor, report.native.metadata
    );
    Ok(())
}
