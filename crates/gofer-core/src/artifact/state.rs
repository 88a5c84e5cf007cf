//! The verification typestate (`§4.D`, resolving the distilled
//! specification's open question about a runtime `verified` flag).
//!
//! An artifact starts life as [`Unverified<K>`] and can only become a
//! [`Verified<K>`] by calling one of the `verify_*` methods below, which
//! perform the actual E2 check (`§4.E`). [`crate::store::sign`] (E1) takes a
//! `Verified<K>` by value, so "sign before verify" is a compile error
//! instead of the runtime `StateError` the distilled spec described.

use std::path::Path;

use crate::artifact::identity::Identity;
use crate::artifact::kind::{DescriptorKind, MetadataKind, SourceKind};
use crate::error::{CoreError, CoreResult};
use crate::h1;
use crate::parse::{self, Descriptor};

/// An artifact that has not yet been verified in this session.
#[derive(Debug, Clone)]
pub struct Unverified<K: crate::artifact::kind::Kind> {
    /// The artifact's identity and path triplet.
    pub identity: Identity<K>,
}

impl<K: crate::artifact::kind::Kind> Unverified<K> {
    /// Wrap an identity as not-yet-verified.
    pub fn new(identity: Identity<K>) -> Self {
        Self { identity }
    }
}

/// An artifact whose content has been checked against its declared checksum
/// (or, for Metadata, its schema) in this session.
#[derive(Debug, Clone)]
pub struct Verified<K: crate::artifact::kind::Kind> {
    /// The artifact's identity and path triplet.
    pub identity: Identity<K>,
}

impl Unverified<SourceKind> {
    /// E2 for a Source: hash `path` (a directory if `as_dir`, otherwise a
    /// zip archive) per `§4.A` and compare to the declared checksum; if a
    /// `.ziphash` side-file exists, it must also equal the checksum.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChecksumMismatch`] if the computed hash (or the
    /// `.ziphash` side-file) disagrees with the declared checksum.
    pub fn verify(self, path: &Path, as_dir: bool, go_path: &Path) -> CoreResult<Verified<SourceKind>> {
        let declared = self
            .identity
            .checksum
            .as_ref()
            .expect("Source identity always carries a checksum")
            .as_str()
            .to_string();

        let computed = if as_dir {
            h1::hash_dir(path, self.identity.name.as_str(), self.identity.version.as_str())?
        } else {
            h1::hash_zip(path)?
        };
        if computed != declared {
            return Err(CoreError::ChecksumMismatch {
                artifact: self.identity.display_name(),
                expected: declared,
                actual: computed,
            });
        }

        let ziphash_path = self.identity.ziphash_path(go_path);
        if ziphash_path.exists() {
            let contents = std::fs::read_to_string(&ziphash_path)?;
            if contents.trim() != declared {
                return Err(CoreError::ChecksumMismatch {
                    artifact: self.identity.display_name(),
                    expected: declared,
                    actual: contents.trim().to_string(),
                });
            }
        }

        Ok(Verified {
            identity: self.identity,
        })
    }
}

impl Unverified<DescriptorKind> {
    /// E2 for a Descriptor: hash `path` per `§4.A`, compare to the declared
    /// checksum, then parse it to populate its Metadata children (one for
    /// itself, one per direct requirement).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ChecksumMismatch`] if the computed hash
    /// disagrees, or a parse error if the descriptor's content is malformed.
    pub fn verify(
        self,
        path: &Path,
    ) -> CoreResult<(Verified<DescriptorKind>, Vec<Identity<MetadataKind>>)> {
        let declared = self
            .identity
            .checksum
            .as_ref()
            .expect("Descriptor identity always carries a checksum")
            .as_str()
            .to_string();

        let computed = h1::hash_descriptor(path)?;
        if computed != declared {
            return Err(CoreError::ChecksumMismatch {
                artifact: self.identity.display_name(),
                expected: declared,
                actual: computed,
            });
        }

        let text = std::fs::read_to_string(path)?;
        let Descriptor { module: _, requires } = parse::parse_descriptor(&text)?;

        let mut children = vec![Identity::unhashed(
            self.identity.name.clone(),
            self.identity.version.clone(),
        )];
        for (name, version) in requires {
            children.push(Identity::unhashed(name, version));
        }

        Ok((
            Verified {
                identity: self.identity,
            },
            children,
        ))
    }
}

impl Unverified<MetadataKind> {
    /// E2 for Metadata: read `path`, confirm canonicalisation, strictly
    /// JSON-decode, and run every field validator.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Schema`] or [`CoreError::Validation`] if the
    /// record is malformed.
    pub fn verify(self, path: &Path) -> CoreResult<Verified<MetadataKind>> {
        let bytes = std::fs::read(path)?;
        parse::parse_metadata(&bytes)?;

        Ok(Verified {
            identity: self.identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofer_schema::{Checksum, ModuleName, ModuleVersion};
    use std::fs;

    #[test]
    fn descriptor_verify_populates_metadata_children() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(
            &path,
            "module github.com/example/mod\n\nrequire github.com/burntsushi/toml v1.3.2\n",
        )
        .unwrap();

        let checksum = h1::hash_descriptor(&path).unwrap();
        let identity = Identity::hashed(
            ModuleName::parse("github.com/example/mod").unwrap(),
            ModuleVersion::parse("v0.1.0").unwrap(),
            Checksum::parse(checksum).unwrap(),
        );

        let (_verified, children) = Unverified::new(identity).verify(&path).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name.as_str(), "github.com/example/mod");
        assert_eq!(children[1].name.as_str(), "github.com/burntsushi/toml");
    }

    #[test]
    fn descriptor_verify_rejects_checksum_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("go.mod");
        fs::write(&path, "module github.com/example/mod\n").unwrap();

        let identity = Identity::hashed(
            ModuleName::parse("github.com/example/mod").unwrap(),
            ModuleVersion::parse("v0.1.0").unwrap(),
            Checksum::parse("h1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap(),
        );

        let err = Unverified::new(identity).verify(&path).unwrap_err();
        assert!(matches!(err, CoreError::ChecksumMismatch { .. }));
    }
}
