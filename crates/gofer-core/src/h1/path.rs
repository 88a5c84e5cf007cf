//! The hash-path alphabet shared by [`super::dir::hash_dir`] and
//! [`super::zip::hash_zip`].

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, CoreResult};

static HASH_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-zA-Z0-9 @!/._-]+$").expect("valid regex"));

/// Validate a synthesised `name@version/relative/path` hash-path: it must
/// match the upstream character alphabet and must not contain a `..`
/// traversal segment, checked independently of the regex since `..` is
/// otherwise a legal sequence of the allowed characters.
pub fn validate_hash_path(path: &str) -> CoreResult<String> {
    if !HASH_PATH_RE.is_match(path) || path.contains("..") {
        return Err(CoreError::State(format!("invalid hash path: {path}")));
    }
    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_path() {
        assert!(validate_hash_path("example.com/x@v0.0.1/foo.txt").is_ok());
    }

    #[test]
    fn rejects_dotdot() {
        assert!(validate_hash_path("example.com/x@v0.0.1/../foo.txt").is_err());
    }

    #[test]
    fn rejects_leading_uppercase() {
        assert!(validate_hash_path("Example.com/x@v0.0.1/foo.txt").is_err());
    }
}
