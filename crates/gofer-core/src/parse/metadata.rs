//! The version-metadata (`.info`) schema: strict JSON decode plus the
//! field-level validators of `§4.B` (`§4.C`).

use serde::Deserialize;

use gofer_schema::validate;

use crate::error::{CoreError, CoreResult};

/// A decoded, field-validated `.info` record.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataRecord {
    /// The module version this record describes.
    #[serde(rename = "Version")]
    pub version: String,
    /// RFC3339 timestamp, `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(rename = "Time")]
    pub time: String,
    /// Provenance information, each field independently optional.
    #[serde(rename = "Origin", default)]
    pub origin: Origin,
}

/// Provenance fields nested under `Origin` in a `.info` record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Origin {
    /// Version-control system; empty or `git`.
    #[serde(rename = "VCS", default)]
    pub vcs: String,
    /// Source URL; empty or matching the fixed host allow-list.
    #[serde(rename = "URL", default)]
    pub url: String,
    /// VCS ref, e.g. `refs/tags/v1.2.3`.
    #[serde(rename = "Ref", default)]
    pub reference: String,
    /// 40-character hex commit hash.
    #[serde(rename = "Hash", default)]
    pub hash: String,
    /// Subdirectory within the repository, if any.
    #[serde(rename = "Subdir", default)]
    pub subdir: String,
}

/// Require that `bytes` is already in canonical form: no control characters
/// other than `\t`, `\n`, and `\r` are tolerated anywhere in the file.
///
/// Stands in for the upstream tooling's "sanitize and compare" check: rather
/// than reject specific bytes and fail later at JSON-decode time, this
/// rejects them explicitly up front so the error names the real problem.
fn assert_canonical(bytes: &[u8]) -> CoreResult<()> {
    let offending = bytes
        .iter()
        .position(|&b| b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r');
    if let Some(pos) = offending {
        return Err(CoreError::Schema {
            artifact: "metadata".into(),
            detail: format!("non-canonical control byte 0x{:02x} at offset {pos}", bytes[pos]),
        });
    }
    Ok(())
}

/// Parse and fully validate a `.info` record.
///
/// # Errors
///
/// Returns [`CoreError::Schema`] if the bytes aren't canonical or contain an
/// unknown field, or [`CoreError::Validation`] if a field fails its pattern
/// validator.
pub fn parse_metadata(bytes: &[u8]) -> CoreResult<MetadataRecord> {
    assert_canonical(bytes)?;

    let record: MetadataRecord = serde_json::from_slice(bytes).map_err(|e| CoreError::Schema {
        artifact: "metadata".into(),
        detail: e.to_string(),
    })?;

    validate::validate_version(&record.version)?;
    validate::validate_time(&record.time)?;
    validate::validate_vcs(&record.origin.vcs)?;
    validate::validate_url(&record.origin.url)?;
    validate::validate_ref(&record.origin.reference)?;
    validate::validate_hash(&record.origin.hash)?;
    validate::validate_subdir(&record.origin.subdir)?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_record() {
        let json = br#"{"Version":"v1.3.2","Time":"2023-05-04T10:20:30Z","Origin":{"VCS":"git","URL":"https://github.com/a/b","Ref":"refs/tags/v1.3.2","Hash":"0123456789abcdef0123456789abcdef01234567","Subdir":""}}"#;
        let record = parse_metadata(json).unwrap();
        assert_eq!(record.version, "v1.3.2");
    }

    #[test]
    fn rejects_unknown_field() {
        let json = br#"{"Version":"v1.3.2","Time":"2023-05-04T10:20:30Z","Bogus":1}"#;
        assert!(parse_metadata(json).is_err());
    }

    #[test]
    fn rejects_bad_url() {
        let json = br#"{"Version":"v1.3.2","Time":"2023-05-04T10:20:30Z","Origin":{"URL":"https://evil.example.com/a"}}"#;
        assert!(parse_metadata(json).is_err());
    }

    #[test]
    fn rejects_unknown_field_nested_under_origin() {
        // `§8` scenario 2, literal.
        let json = br#"{"Version":"v1.0.0","Time":"2020-01-01T00:00:00Z","Origin":{"VCS":"git","URL":"https://github.com/a/b","Ref":"refs/tags/v1.0.0","Hash":"0123456789abcdef0123456789abcdef01234567","Subdir":"","Extra":1}}"#;
        assert!(parse_metadata(json).is_err());
    }

    #[test]
    fn verifies_once_the_unknown_field_is_removed() {
        let json = br#"{"Version":"v1.0.0","Time":"2020-01-01T00:00:00Z","Origin":{"VCS":"git","URL":"https://github.com/a/b","Ref":"refs/tags/v1.0.0","Hash":"0123456789abcdef0123456789abcdef01234567","Subdir":""}}"#;
        assert!(parse_metadata(json).is_ok());
    }

    #[test]
    fn rejects_control_bytes() {
        let mut json = br#"{"Version":"v1.3.2","Time":"2023-05-04T10:20:30Z"}"#.to_vec();
        json.push(0x07);
        assert!(parse_metadata(&json).is_err());
    }
}
