//! The cache reconciler: three top-level operations driven across every
//! artifact a manifest set implies (`§4.F`).

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use gofer_schema::ArtifactKind;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::artifact::{DescriptorKind, Identity, MetadataKind, SourceKind, Unverified};
use crate::error::{CoreError, CoreResult};
use crate::parse::ManifestEntry;
use crate::reporter::Reporter;
use crate::store::{self, Context};

/// Per-kind counts produced by [`verify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounts {
    /// Source artifacts counted.
    pub source: usize,
    /// Descriptor artifacts counted.
    pub descriptor: usize,
    /// Metadata artifacts counted.
    pub metadata: usize,
}

impl KindCounts {
    fn bump(&mut self, kind: ArtifactKind) {
        match kind {
            ArtifactKind::Source => self.source += 1,
            ArtifactKind::Descriptor => self.descriptor += 1,
            ArtifactKind::Metadata => self.metadata += 1,
        }
    }

    /// Total across all three kinds.
    pub fn total(&self) -> usize {
        self.source + self.descriptor + self.metadata
    }
}

/// Report produced by [`verify`] (`§4.F1` step 4).
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Signature-store files verified, by kind.
    pub signed: KindCounts,
    /// Native-cache files verified, by kind.
    pub native: KindCounts,
}

struct KnownArtifacts {
    source: HashMap<String, Identity<SourceKind>>,
    descriptor: HashMap<String, Identity<DescriptorKind>>,
    metadata: HashMap<String, Identity<MetadataKind>>,
}

impl KnownArtifacts {
    fn from_entries(entries: &[ManifestEntry]) -> Self {
        let mut source = HashMap::new();
        let mut descriptor = HashMap::new();
        for entry in entries {
            match entry.kind {
                ArtifactKind::Source => {
                    let id: Identity<SourceKind> =
                        Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
                    source.insert(id.sig_name(), id);
                }
                ArtifactKind::Descriptor => {
                    let id: Identity<DescriptorKind> =
                        Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
                    descriptor.insert(id.sig_name(), id);
                }
                ArtifactKind::Metadata => {}
            }
        }
        Self {
            source,
            descriptor,
            metadata: HashMap::new(),
        }
    }

    fn absorb_children(&mut self, children: Vec<Identity<MetadataKind>>) {
        for child in children {
            self.metadata.insert(child.sig_name(), child);
        }
    }
}

fn sig_sort_key(path: &Path) -> (u8, String) {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let phase = if name.ends_with(".mod.gopkg") {
        ArtifactKind::Descriptor.sort_phase()
    } else {
        ArtifactKind::Source.sort_phase()
    };
    (phase, name)
}

/// `§4.F1`: verify every artifact implied by `entries`, entirely offline.
///
/// Traverses the signature store first (Descriptors before any other
/// suffix, so their Metadata children are known before being considered),
/// then the native cache.
///
/// # Errors
///
/// The first verification failure is fatal; the partial [`VerifyReport`]
/// accumulated so far is not returned on error (callers that need partial
/// progress should use [`Reporter`] events, which are emitted as each
/// artifact passes).
pub fn verify(ctx: &Context, reporter: &dyn Reporter, entries: &[ManifestEntry]) -> CoreResult<VerifyReport> {
    let mut known = KnownArtifacts::from_entries(entries);
    let mut report = VerifyReport::default();

    let mut sig_files: Vec<_> = if ctx.sig_root.exists() {
        fs::read_dir(&ctx.sig_root)?
            .map(|e| e.map(|e| e.path()))
            .collect::<Result<_, _>>()?
    } else {
        Vec::new()
    };
    sig_files.sort_by_key(|p| sig_sort_key(p));

    for path in &sig_files {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();

        if let Some(identity) = known.descriptor.get(&name).cloned() {
            let (_verified, children) = verify_signed_descriptor(ctx, &identity, path)?;
            known.absorb_children(children);
            reporter.event(&identity.display_name(), "verified", "signature store");
            report.signed.bump(ArtifactKind::Descriptor);
            continue;
        }
        if let Some(identity) = known.source.get(&name).cloned() {
            verify_signed_source(ctx, &identity, path)?;
            reporter.event(&identity.display_name(), "verified", "signature store");
            report.signed.bump(ArtifactKind::Source);
            continue;
        }
        if let Some(identity) = known.metadata.get(&name).cloned() {
            verify_signed_metadata(ctx, &identity, path)?;
            reporter.event(&identity.display_name(), "verified", "signature store");
            report.signed.bump(ArtifactKind::Metadata);
        }
    }

    for identity in known.source.values() {
        let native_zip = identity.native_path(&ctx.go_path);
        if native_zip.exists() {
            Unverified::new(identity.clone()).verify(&native_zip, false, &ctx.go_path)?;
            reporter.event(&identity.display_name(), "verified", "native cache");
            report.native.bump(ArtifactKind::Source);
        }
        let native_dir = identity.native_dir_path(&ctx.go_path);
        if native_dir.exists() {
            Unverified::new(identity.clone()).verify(&native_dir, true, &ctx.go_path)?;
        }
    }
    for identity in known.descriptor.values() {
        let native_mod = identity.native_path(&ctx.go_path);
        if native_mod.exists() {
            Unverified::new(identity.clone()).verify(&native_mod)?;
            reporter.event(&identity.display_name(), "verified", "native cache");
            report.native.bump(ArtifactKind::Descriptor);
        }
    }
    for identity in known.metadata.values() {
        let native_info = identity.native_path(&ctx.go_path);
        if native_info.exists() {
            Unverified::new(identity.clone()).verify(&native_info)?;
            reporter.event(&identity.display_name(), "verified", "native cache");
            report.native.bump(ArtifactKind::Metadata);
        }
    }

    Ok(report)
}

fn verify_signed_source(ctx: &Context, identity: &Identity<SourceKind>, sig_path: &Path) -> CoreResult<()> {
    let (payload, _signer) = store::read_back(ctx, sig_path)?;
    let tmp = tempfile::NamedTempFile::new()?;
    fs::write(tmp.path(), &payload)?;
    Unverified::new(identity.clone()).verify(tmp.path(), false, &ctx.go_path)?;
    Ok(())
}

fn verify_signed_descriptor(
    ctx: &Context,
    identity: &Identity<DescriptorKind>,
    sig_path: &Path,
) -> CoreResult<((), Vec<Identity<MetadataKind>>)> {
    let (payload, _signer) = store::read_back(ctx, sig_path)?;
    let tmp = tempfile::NamedTempFile::new()?;
    fs::write(tmp.path(), &payload)?;
    let (_verified, children) = Unverified::new(identity.clone()).verify(tmp.path())?;
    Ok(((), children))
}

fn verify_signed_metadata(ctx: &Context, identity: &Identity<MetadataKind>, sig_path: &Path) -> CoreResult<()> {
    let (payload, _signer) = store::read_back(ctx, sig_path)?;
    let tmp = tempfile::NamedTempFile::new()?;
    fs::write(tmp.path(), &payload)?;
    Unverified::new(identity.clone()).verify(tmp.path())?;
    Ok(())
}

/// `§4.F2`: create the signature store if absent, then sign every artifact
/// a manifest implies after verifying it locally.
///
/// # Errors
///
/// The first verification or signing failure is fatal.
pub fn verify_and_sign(ctx: &Context, reporter: &dyn Reporter, entries: &[ManifestEntry]) -> CoreResult<KindCounts> {
    fs::create_dir_all(&ctx.sig_root)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&ctx.sig_root, fs::Permissions::from_mode(0o700))?;
    }

    let mut signed = KindCounts::default();

    for entry in entries {
        match entry.kind {
            ArtifactKind::Source => {
                let identity: Identity<SourceKind> =
                    Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
                let native_dir = identity.native_dir_path(&ctx.go_path);
                let verified = Unverified::new(identity.clone()).verify(&native_dir, true, &ctx.go_path)?;
                // The directory hash confirms the extracted tree matches the
                // declared checksum; the signed blob itself wraps the zip
                // archive, since that is the form the signature store's
                // path triplet names (`§3`) and what a later download
                // reproduces byte-for-byte.
                let native_zip = identity.native_path(&ctx.go_path);
                store::sign(ctx, &verified, &native_zip)?;
                reporter.event(&identity.display_name(), "signed", "");
                signed.bump(ArtifactKind::Source);
            }
            ArtifactKind::Descriptor => {
                let identity: Identity<DescriptorKind> =
                    Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
                let native_mod = identity.native_path(&ctx.go_path);
                let (verified, children) = Unverified::new(identity.clone()).verify(&native_mod)?;

                for child in &children {
                    let native_info = child.native_path(&ctx.go_path);
                    if native_info.exists() {
                        let child_verified = Unverified::new(child.clone()).verify(&native_info)?;
                        store::sign(ctx, &child_verified, &native_info)?;
                        reporter.event(&child.display_name(), "signed", "");
                        signed.bump(ArtifactKind::Metadata);
                    }
                }

                store::sign(ctx, &verified, &native_mod)?;
                reporter.event(&identity.display_name(), "signed", "");
                signed.bump(ArtifactKind::Descriptor);
            }
            ArtifactKind::Metadata => {}
        }
    }

    Ok(signed)
}

/// `§4.F3`: download, verify, and install every artifact a manifest
/// implies, at a concurrency ceiling of 3 (`§5`).
///
/// Phase 1 launches one task per Descriptor and joins before phase 2 is
/// constructed, since Descriptor parsing is what produces the Metadata
/// child set (`§5` "ordering guarantees"). Phase 2 launches one task per
/// deduplicated Metadata child and one per Source, all in the same pool.
///
/// # Errors
///
/// The first task error is returned once every already-launched task has
/// finished; `NotFound` is tolerated (downgraded to a debug report) only
/// for Metadata tasks.
pub async fn download_and_verify(
    ctx: &Context,
    reporter: Arc<dyn Reporter>,
    entries: &[ManifestEntry],
    base_url: &str,
) -> CoreResult<()> {
    let semaphore = Arc::new(Semaphore::new(ctx.concurrency));

    let mut phase1: JoinSet<CoreResult<Vec<Identity<MetadataKind>>>> = JoinSet::new();
    for entry in entries.iter().filter(|e| e.kind == ArtifactKind::Descriptor) {
        let identity: Identity<DescriptorKind> =
            Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
        let ctx = ctx.clone();
        let sem = semaphore.clone();
        let base_url = base_url.to_string();
        let reporter = reporter.clone();
        phase1.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore is never closed");
            let uri = format!("{base_url}/{}", identity.sig_name());
            let (outcome, children) =
                store::download_and_verify_descriptor(&ctx, Unverified::new(identity), &uri).await?;
            reporter.event(&outcome.verified.identity.display_name(), "verified", &outcome.token);
            Ok(children)
        });
    }

    let mut children_acc = Vec::new();
    while let Some(res) = phase1.join_next().await {
        let children = res.map_err(|e| CoreError::State(format!("descriptor task panicked: {e}")))??;
        children_acc.extend(children);
    }

    let mut seen = HashSet::new();
    let children: Vec<_> = children_acc
        .into_iter()
        .filter(|c| seen.insert((c.name.clone(), c.version.clone())))
        .collect();

    let mut phase2: JoinSet<CoreResult<()>> = JoinSet::new();
    for identity in children {
        let ctx = ctx.clone();
        let sem = semaphore.clone();
        let base_url = base_url.to_string();
        let reporter = reporter.clone();
        phase2.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore is never closed");
            let uri = format!("{base_url}/{}", identity.sig_name());
            let display = identity.display_name();
            match store::download_and_verify_metadata(&ctx, Unverified::new(identity), &uri).await {
                Ok(outcome) => {
                    reporter.event(&outcome.verified.identity.display_name(), "verified", &outcome.token);
                    Ok(())
                }
                Err(CoreError::NotFound(detail)) => {
                    reporter.debug(&display, &format!("not found on mirror: {detail}"));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        });
    }
    for entry in entries.iter().filter(|e| e.kind == ArtifactKind::Source) {
        let identity: Identity<SourceKind> =
            Identity::hashed(entry.name.clone(), entry.version.clone(), entry.checksum.clone());
        let ctx = ctx.clone();
        let sem = semaphore.clone();
        let base_url = base_url.to_string();
        let reporter = reporter.clone();
        phase2.spawn(async move {
            let _permit = sem.acquire_owned().await.expect("semaphore is never closed");
            let uri = format!("{base_url}/{}", identity.sig_name());
            let hash_out = identity.ziphash_path(&ctx.go_path);
            let outcome = store::download_and_verify_source(&ctx, Unverified::new(identity), &uri, &hash_out).await?;
            reporter.event(&outcome.verified.identity.display_name(), "verified", &outcome.token);
            Ok(())
        });
    }

    let mut first_err: Option<CoreError> = None;
    while let Some(res) = phase2.join_next().await {
        let result = match res {
            Ok(r) => r,
            Err(e) => Err(CoreError::State(format!("task panicked: {e}"))),
        };
        if let Err(e) = result {
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    if let Some(e) = first_err {
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofer_blob::{Keyring, SigningIdentity};
    use gofer_schema::{Checksum, ModuleName, ModuleVersion};

    fn ctx() -> (tempfile::TempDir, Context) {
        let dir = tempfile::tempdir().unwrap();
        let identity = SigningIdentity::generate();
        let keyring = Keyring::with_identity(vec![], identity);
        let ctx = Context {
            go_path: dir.path().join("go"),
            sig_root: dir.path().join("sig"),
            keyring: Arc::new(keyring),
            blob_type: "gofer.test".to_string(),
            concurrency: 3,
            client: reqwest::Client::new(),
        };
        (dir, ctx)
    }

    #[test]
    fn verify_and_sign_then_verify_round_trips() {
        let (dir, ctx) = ctx();

        let name = ModuleName::parse("example.com/x").unwrap();
        let version = ModuleVersion::parse("v0.1.0").unwrap();

        let mod_text = "module example.com/x\n";

        // Write the descriptor to its native path first so the hash can be
        // computed from the same bytes the reconciler will later verify.
        let placeholder: Identity<DescriptorKind> = Identity::hashed(
            name.clone(),
            version.clone(),
            Checksum::parse("h1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap(),
        );
        let native_mod = placeholder.native_path(&ctx.go_path);
        fs::create_dir_all(native_mod.parent().unwrap()).unwrap();
        fs::write(&native_mod, mod_text).unwrap();

        let descriptor_hash = crate::h1::hash_descriptor(&native_mod).unwrap();
        let checksum = Checksum::parse(descriptor_hash).unwrap();
        let identity: Identity<DescriptorKind> = Identity::hashed(name.clone(), version.clone(), checksum.clone());

        let entries = vec![ManifestEntry {
            name,
            version,
            checksum,
            kind: ArtifactKind::Descriptor,
        }];

        let reporter = crate::reporter::NullReporter;
        verify_and_sign(&ctx, &reporter, &entries).unwrap();

        let report = verify(&ctx, &reporter, &entries).unwrap();
        assert_eq!(report.signed.descriptor, 1);
        assert_eq!(report.native.descriptor, 1);

        drop(dir);
    }

    #[test]
    fn checksum_mismatch_surfaces_for_the_offending_artifact() {
        // `§8` scenario 3, literal.
        let (dir, ctx) = ctx();

        let name = ModuleName::parse("m").unwrap();
        let version = ModuleVersion::parse("v1").unwrap();
        let declared = Checksum::parse("h1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();

        let identity: Identity<DescriptorKind> = Identity::hashed(name.clone(), version.clone(), declared.clone());
        let native_mod = identity.native_path(&ctx.go_path);
        fs::create_dir_all(native_mod.parent().unwrap()).unwrap();
        fs::write(&native_mod, b"module m\n").unwrap();

        let entries = vec![ManifestEntry {
            name,
            version,
            checksum: declared,
            kind: ArtifactKind::Descriptor,
        }];

        let reporter = crate::reporter::NullReporter;
        let err = verify(&ctx, &reporter, &entries).unwrap_err();
        assert!(matches!(err, CoreError::ChecksumMismatch { .. }));

        drop(dir);
    }
}
