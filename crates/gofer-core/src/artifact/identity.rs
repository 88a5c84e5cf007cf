//! Artifact identity and its deterministic path triplet (`§3`, `§4.D`).

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use gofer_schema::{Checksum, ModuleName, ModuleVersion, escape};

use super::kind::{Kind, SourceKind};

/// The `(name, version, checksum)` identity of one artifact, typed by its
/// [`Kind`] marker. `Metadata` artifacts carry no checksum (their integrity
/// is structural), so `checksum` is `None` for [`super::MetadataKind`].
#[derive(Debug, Clone)]
pub struct Identity<K: Kind> {
    /// Module name.
    pub name: ModuleName,
    /// Module version (no `/go.mod` suffix).
    pub version: ModuleVersion,
    /// Declared content checksum, `None` for Metadata.
    pub checksum: Option<Checksum>,
    _kind: PhantomData<K>,
}

impl<K: Kind> Identity<K> {
    /// Construct an identity for a hashed kind (Source or Descriptor).
    pub fn hashed(name: ModuleName, version: ModuleVersion, checksum: Checksum) -> Self {
        Self {
            name,
            version,
            checksum: Some(checksum),
            _kind: PhantomData,
        }
    }

    /// Construct an identity for Metadata, which has no checksum.
    pub fn unhashed(name: ModuleName, version: ModuleVersion) -> Self {
        Self {
            name,
            version,
            checksum: None,
            _kind: PhantomData,
        }
    }

    /// The display name used in ranked log output, mirroring the original
    /// tooling's per-kind `String()` method: `name@version` for Source,
    /// `name@version.mod` for Descriptor, `name@version.info` for Metadata.
    pub fn display_name(&self) -> String {
        format!("{}@{}{}", self.name, self.version, K::DISPLAY_SUFFIX)
    }

    /// The case-folded cache key, `!x`-escaped per [`escape::escape_name`].
    fn escaped_name(&self) -> String {
        escape::escape_name(self.name.as_str())
    }

    /// Native-cache file name: `<version>.<ext>`.
    pub fn native_name(&self) -> String {
        format!("{}.{}", self.version, K::KIND.extension())
    }

    /// Native-cache file path: `<go_path>/pkg/mod/cache/download/<escaped-name>/@v/<version>.<ext>`.
    pub fn native_path(&self, go_path: &Path) -> PathBuf {
        go_path
            .join("pkg")
            .join("mod")
            .join("cache")
            .join("download")
            .join(self.escaped_name())
            .join("@v")
            .join(self.native_name())
    }

    /// Signature-store file name: `<name-with-/-as-@>@<version>.<ext>.gopkg`.
    pub fn sig_name(&self) -> String {
        format!(
            "{}@{}.{}.gopkg",
            escape::slash_to_at(self.name.as_str()),
            self.version,
            K::KIND.extension()
        )
    }

    /// Signature-store file path: `<sig_root>/<sig_name>`.
    pub fn sig_path(&self, sig_root: &Path) -> PathBuf {
        sig_root.join(self.sig_name())
    }
}

impl Identity<SourceKind> {
    /// Native extracted-directory path: `<go_path>/pkg/mod/<escaped-name>@<version>`.
    /// Only Source artifacts have an extracted form.
    pub fn native_dir_path(&self, go_path: &Path) -> PathBuf {
        go_path
            .join("pkg")
            .join("mod")
            .join(format!("{}@{}", self.escaped_name(), self.version))
    }

    /// `.ziphash` side-file path, adjacent to [`Identity::native_path`].
    pub fn ziphash_path(&self, go_path: &Path) -> PathBuf {
        go_path
            .join("pkg")
            .join("mod")
            .join("cache")
            .join("download")
            .join(self.escaped_name())
            .join("@v")
            .join(format!("{}.ziphash", self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::kind::{DescriptorKind, MetadataKind};

    fn checksum() -> Checksum {
        Checksum::parse("h1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap()
    }

    #[test]
    fn source_native_path_escapes_uppercase() {
        let id: Identity<SourceKind> = Identity::hashed(
            ModuleName::parse("github.com/BurntSushi/toml").unwrap(),
            ModuleVersion::parse("v1.3.2").unwrap(),
            checksum(),
        );
        let path = id.native_path(Path::new("/home/user/go"));
        assert_eq!(
            path,
            Path::new("/home/user/go/pkg/mod/cache/download/github.com/!burnt!sushi/toml/@v/v1.3.2.zip")
        );
    }

    #[test]
    fn source_dir_and_ziphash_paths() {
        let id: Identity<SourceKind> = Identity::hashed(
            ModuleName::parse("github.com/a/b").unwrap(),
            ModuleVersion::parse("v1.0.0").unwrap(),
            checksum(),
        );
        let go = Path::new("/go");
        assert_eq!(id.native_dir_path(go), Path::new("/go/pkg/mod/github.com/a/b@v1.0.0"));
        assert_eq!(
            id.ziphash_path(go),
            Path::new("/go/pkg/mod/cache/download/github.com/a/b/@v/v1.0.0.ziphash")
        );
    }

    #[test]
    fn descriptor_sig_path_and_display_name() {
        let id: Identity<DescriptorKind> = Identity::hashed(
            ModuleName::parse("github.com/a/b").unwrap(),
            ModuleVersion::parse("v1.0.0").unwrap(),
            checksum(),
        );
        assert_eq!(id.sig_name(), "github.com@a@b@v1.0.0.mod.gopkg");
        assert_eq!(id.display_name(), "github.com/a/b@v1.0.0.mod");
    }

    #[test]
    fn metadata_has_no_checksum() {
        let id: Identity<MetadataKind> = Identity::unhashed(
            ModuleName::parse("github.com/a/b").unwrap(),
            ModuleVersion::parse("v1.0.0").unwrap(),
        );
        assert!(id.checksum.is_none());
        assert_eq!(id.native_name(), "v1.0.0.info");
    }
}
