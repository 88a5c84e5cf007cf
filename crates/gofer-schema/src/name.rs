//! Validated module name newtype.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, validate_name};

/// A module name (e.g. `github.com/BurntSushi/toml`), validated against
/// `^[a-z][a-zA-Z0-9/._-]+$` with no `..` substring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleName(String);

impl ModuleName {
    /// Parse and validate a module name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Name`] if `s` does not match the module
    /// name grammar.
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        validate_name(&s)?;
        Ok(Self(s))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ModuleName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ModuleName> for String {
    fn from(value: ModuleName) -> Self {
        value.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ModuleName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid() {
        assert!(ModuleName::parse("Bad/Name").is_err());
        assert!(ModuleName::parse("bad/../name").is_err());
    }

    #[test]
    fn accepts_valid() {
        let n = ModuleName::parse("github.com/BurntSushi/toml").unwrap();
        assert_eq!(n.as_str(), "github.com/BurntSushi/toml");
    }
}
