//! Validated module version newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, validate_version};

/// A module version (e.g. `v1.2.3`), validated against `^v[a-z0-9.-]+$` with
/// no `..` substring. A trailing `/go.mod` suffix is accepted and stripped,
/// recorded in [`ModuleVersion::is_descriptor_row`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleVersion {
    value: String,
    is_descriptor_row: bool,
}

impl ModuleVersion {
    /// Parse and validate a module version, stripping any `/go.mod` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Version`] if the (suffix-stripped) string
    /// does not match the version grammar.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let (value, is_descriptor_row) = validate_version(s)?;
        Ok(Self {
            value,
            is_descriptor_row,
        })
    }

    /// Construct directly from an already-validated bare version string
    /// (no `/go.mod` suffix).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Version`] if `s` does not match the version
    /// grammar.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let (value, _) = validate_version(&s)?;
        Ok(Self {
            value,
            is_descriptor_row: false,
        })
    }

    /// Whether the original input carried a `/go.mod` suffix, marking the
    /// manifest row as a Descriptor rather than a Source.
    pub fn is_descriptor_row(&self) -> bool {
        self.is_descriptor_row
    }

    /// Borrow the bare version string (no `/go.mod` suffix).
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for ModuleVersion {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_version() {
        let v = ModuleVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.as_str(), "v1.2.3");
        assert!(!v.is_descriptor_row());
    }

    #[test]
    fn parse_go_mod_suffix() {
        let v = ModuleVersion::parse("v1.2.3/go.mod").unwrap();
        assert_eq!(v.as_str(), "v1.2.3");
        assert!(v.is_descriptor_row());
    }

    #[test]
    fn rejects_invalid() {
        assert!(ModuleVersion::parse("1.2.3").is_err());
    }
}
