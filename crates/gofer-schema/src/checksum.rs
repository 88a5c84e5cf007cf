//! Validated `h1:` checksum newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, validate_checksum};

/// An `h1:`-prefixed content checksum: 47 bytes total, `h1:` followed by 44
/// base64 characters (`§3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Parse and validate a checksum string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Checksum`] if `s` is not exactly 47 bytes
    /// matching `^h1:[a-zA-Z0-9+/=]{{44}}$`.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        validate_checksum(&s)?;
        debug_assert_eq!(s.len(), 47, "h1 checksum must be exactly 47 bytes");
        Ok(Self(s))
    }

    /// Borrow the checksum string, including the `h1:` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Checksum {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Checksum> for String {
    fn from(value: Checksum) -> Self {
        value.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_length_required() {
        let ok = "h1:AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        assert_eq!(ok.len(), 47);
        assert!(Checksum::parse(ok).is_ok());
        assert!(Checksum::parse("h1:AAAA").is_err());
    }
}
