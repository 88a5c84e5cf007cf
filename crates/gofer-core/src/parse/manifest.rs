//! The checksum manifest reader: `name SP version SP checksum` lines,
//! folded into a deduplicated artifact set (`§4.C`).

use std::path::Path;

use gofer_schema::{ArtifactKind, Checksum, ModuleName, ModuleVersion};

use crate::error::{CoreError, CoreResult};

/// One `(name, version, checksum)` triple read from a manifest, with the
/// kind already inferred from the `/go.mod` version suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Module name.
    pub name: ModuleName,
    /// Module version, with any `/go.mod` suffix stripped.
    pub version: ModuleVersion,
    /// Declared content checksum.
    pub checksum: Checksum,
    /// `Descriptor` if the raw version line carried the `/go.mod` suffix,
    /// `Source` otherwise.
    pub kind: ArtifactKind,
}

/// Read and fold one or more manifest files into a deduplicated entry set.
///
/// Entries are folded by their full `(name, version, checksum)` triple, in
/// first-seen order. A malformed line (wrong field count, or a field that
/// fails its validator) is fatal.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] for a malformed field, or
/// [`CoreError::Io`] if a manifest file cannot be read.
pub fn read_manifests(paths: &[impl AsRef<Path>]) -> CoreResult<Vec<ManifestEntry>> {
    let mut seen = std::collections::HashSet::new();
    let mut entries = Vec::new();

    for path in paths {
        let text = std::fs::read_to_string(path.as_ref())?;
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = parse_line(line).map_err(|e| {
                CoreError::State(format!(
                    "{}:{}: {e}",
                    path.as_ref().display(),
                    lineno + 1
                ))
            })?;

            let key = (
                entry.name.as_str().to_string(),
                entry.version.as_str().to_string(),
                entry.checksum.as_str().to_string(),
            );
            if seen.insert(key) {
                entries.push(entry);
            }
        }
    }

    Ok(entries)
}

fn parse_line(line: &str) -> CoreResult<ManifestEntry> {
    let fields: Vec<&str> = line.split(' ').collect();
    let [name, version, checksum] = fields.as_slice() else {
        return Err(CoreError::State(format!("invalid line: {line}")));
    };

    let name = ModuleName::parse(*name)?;
    let version = ModuleVersion::parse(version)?;
    let kind = if version.is_descriptor_row() {
        ArtifactKind::Descriptor
    } else {
        ArtifactKind::Source
    };
    let checksum = Checksum::parse(*checksum)?;

    Ok(ManifestEntry {
        name,
        version,
        checksum,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(f, "{line}").unwrap();
        }
        f
    }

    #[test]
    fn parses_source_and_descriptor_lines() {
        let f = write_manifest(&[
            "github.com/burntsushi/toml v1.3.2 h1:o7IhLm0Msx3BaB+n3Ag7L8EVlByGnpq14C4YWiu/gL8=",
            "github.com/burntsushi/toml v1.3.2/go.mod h1:o7IhLm0Msx3BaB+n3Ag7L8EVlByGnpq14C4YWiu/gL8=",
        ]);

        let entries = read_manifests(&[f.path()]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, gofer_schema::ArtifactKind::Source);
        assert_eq!(entries[1].kind, gofer_schema::ArtifactKind::Descriptor);
    }

    #[test]
    fn dedups_identical_triples() {
        let f = write_manifest(&[
            "github.com/burntsushi/toml v1.3.2 h1:o7IhLm0Msx3BaB+n3Ag7L8EVlByGnpq14C4YWiu/gL8=",
            "github.com/burntsushi/toml v1.3.2 h1:o7IhLm0Msx3BaB+n3Ag7L8EVlByGnpq14C4YWiu/gL8=",
        ]);

        let entries = read_manifests(&[f.path()]).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rejects_malformed_line() {
        let f = write_manifest(&["only two fields"]);
        assert!(read_manifests(&[f.path()]).is_err());
    }
}
