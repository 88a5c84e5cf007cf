//! The artifact-kind enum shared by every artifact-facing crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three artifact kinds named in `§3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A module source archive (`.zip`) plus its extracted directory form.
    Source,
    /// A build-descriptor file (`.mod`).
    Descriptor,
    /// A version-metadata record (`.info`).
    Metadata,
}

impl ArtifactKind {
    /// The phase this kind sorts into during `§4.F1`'s signature-store
    /// traversal: Descriptors must be fully processed before any Metadata
    /// entry is considered, so the phase is an explicit sort discriminant
    /// rather than incidental filename lexicography.
    pub fn sort_phase(self) -> u8 {
        match self {
            ArtifactKind::Descriptor => 0,
            ArtifactKind::Source | ArtifactKind::Metadata => 1,
        }
    }

    /// The file extension used in both the native cache and (composed with
    /// `.gopkg`) the signature store.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Source => "zip",
            ArtifactKind::Descriptor => "mod",
            ArtifactKind::Metadata => "info",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Source => "source",
            ArtifactKind::Descriptor => "descriptor",
            ArtifactKind::Metadata => "metadata",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_sorts_before_others() {
        assert!(ArtifactKind::Descriptor.sort_phase() < ArtifactKind::Source.sort_phase());
        assert!(ArtifactKind::Descriptor.sort_phase() < ArtifactKind::Metadata.sort_phase());
    }
}
