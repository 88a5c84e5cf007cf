//! Per-kind marker types used as the generic parameter of [`super::Identity`].

use gofer_schema::ArtifactKind;

/// Compile-time counterpart of [`ArtifactKind`]: a zero-sized marker type
/// per kind, so [`super::Identity<K>`] and the typestate wrappers in
/// [`super::state`] can offer kind-specific methods (e.g. a native
/// extracted-directory path, which only Source has) without a runtime
/// `match`.
pub trait Kind: Copy + Clone + std::fmt::Debug + 'static {
    /// The runtime [`ArtifactKind`] this marker corresponds to.
    const KIND: ArtifactKind;
    /// Suffix appended to `name@version` for log/display purposes, mirroring
    /// the original tooling's per-kind `String()` method.
    const DISPLAY_SUFFIX: &'static str;
}

/// Marker for a module source archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceKind;

impl Kind for SourceKind {
    const KIND: ArtifactKind = ArtifactKind::Source;
    const DISPLAY_SUFFIX: &'static str = "";
}

/// Marker for a build-descriptor file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorKind;

impl Kind for DescriptorKind {
    const KIND: ArtifactKind = ArtifactKind::Descriptor;
    const DISPLAY_SUFFIX: &'static str = ".mod";
}

/// Marker for a version-metadata record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataKind;

impl Kind for MetadataKind {
    const KIND: ArtifactKind = ArtifactKind::Metadata;
    const DISPLAY_SUFFIX: &'static str = ".info";
}
