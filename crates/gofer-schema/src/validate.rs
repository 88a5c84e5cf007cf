//! Field-level syntactic validators (`§4.B` of the specification).
//!
//! Each function here is a pure string-in, typed-result-out check. None of
//! them read the filesystem or allocate beyond the error path.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// A string failed one of the validators below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The `name` field did not match `^[a-z][a-zA-Z0-9/._-]+$` or contained `..`.
    #[error("invalid module name: {0:?}")]
    Name(String),
    /// The `version` field did not match `^v[a-z0-9.-]+$` or contained `..`.
    #[error("invalid module version: {0:?}")]
    Version(String),
    /// The checksum did not match `^h1:[a-zA-Z0-9+/=]{{44}}$`.
    #[error("invalid checksum: {0:?}")]
    Checksum(String),
    /// A metadata field failed its specific pattern.
    #[error("invalid metadata.{field}: {value:?}")]
    Metadata {
        /// Which metadata field failed (`time`, `vcs`, `url`, `ref`, `hash`, `subdir`).
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

fn no_dotdot(s: &str) -> bool {
    !s.contains("..")
}

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9/._-]+$").expect("valid regex"));

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v[a-z0-9.-]+$").expect("valid regex"));

static CHECKSUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^h1:[a-zA-Z0-9+/=]{44}$").expect("valid regex"));

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex")
});

static REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^refs/tags/v?[a-z0-9.-]+$").expect("valid regex"));

static HASH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("valid regex"));

static SUBDIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9/]+$").expect("valid regex"));

static URL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9/-]+$").expect("valid regex"));

/// The fixed host allow-list for `metadata.url` (`§6`).
pub const URL_HOST_ALLOWLIST: &[&str] = &[
    "cloud.google.com",
    "dario.cat",
    "github.com",
    "go.googlesource.com",
    "golang.org",
    "gopkg.in",
    "honnef.co",
    "rsc.io",
];

/// Validate a module name: `^[a-z][a-zA-Z0-9/._-]+$`, no `..`.
///
/// # Errors
///
/// Returns [`ValidationError::Name`] if the pattern fails or `..` is present.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if no_dotdot(name) && NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::Name(name.to_string()))
    }
}

/// Validate a module version, stripping a trailing `/go.mod` suffix first.
///
/// Returns `true` in the second element of the tuple if the `/go.mod` suffix
/// was present (signalling a Descriptor row in the manifest).
///
/// # Errors
///
/// Returns [`ValidationError::Version`] if the (suffix-stripped) pattern fails
/// or `..` is present.
pub fn validate_version(version: &str) -> Result<(String, bool), ValidationError> {
    let (stripped, is_descriptor) = match version.strip_suffix("/go.mod") {
        Some(rest) => (rest, true),
        None => (version, false),
    };

    if no_dotdot(stripped) && VERSION_RE.is_match(stripped) {
        Ok((stripped.to_string(), is_descriptor))
    } else {
        Err(ValidationError::Version(version.to_string()))
    }
}

/// Validate a `h1:`-prefixed checksum: `^h1:[a-zA-Z0-9+/=]{{44}}$`.
///
/// # Errors
///
/// Returns [`ValidationError::Checksum`] if the pattern fails.
pub fn validate_checksum(checksum: &str) -> Result<(), ValidationError> {
    if CHECKSUM_RE.is_match(checksum) {
        Ok(())
    } else {
        Err(ValidationError::Checksum(checksum.to_string()))
    }
}

/// Validate `metadata.Time`: `^\d{{4}}-\d{{2}}-\d{{2}}T\d{{2}}:\d{{2}}:\d{{2}}Z$`.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] if the pattern fails.
pub fn validate_time(value: &str) -> Result<(), ValidationError> {
    if TIME_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Metadata {
            field: "time",
            value: value.to_string(),
        })
    }
}

/// Validate `metadata.Origin.VCS`: must be empty or the literal `git`.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] otherwise.
pub fn validate_vcs(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value == "git" {
        Ok(())
    } else {
        Err(ValidationError::Metadata {
            field: "vcs",
            value: value.to_string(),
        })
    }
}

/// Validate `metadata.Origin.URL` against the fixed host allow-list (`§6`).
///
/// Empty is accepted. A non-empty value must start with `https://`, the host
/// portion must be exactly one of [`URL_HOST_ALLOWLIST`] (no subdomains), and
/// the path must be non-empty and match `^[a-zA-Z0-9/-]+$`.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] otherwise.
pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    let bad = || ValidationError::Metadata {
        field: "url",
        value: value.to_string(),
    };

    let rest = value.strip_prefix("https://").ok_or_else(bad)?;
    let (host, path) = rest.split_once('/').ok_or_else(bad)?;

    let host_ok = URL_HOST_ALLOWLIST.iter().any(|allowed| host == *allowed);
    if !host_ok {
        return Err(bad());
    }

    if path.is_empty() || !URL_PATH_RE.is_match(path) {
        return Err(bad());
    }

    Ok(())
}

/// Validate `metadata.Origin.Ref`: `^refs/tags/v?[a-z0-9.-]+$`, no `..`.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] otherwise.
pub fn validate_ref(value: &str) -> Result<(), ValidationError> {
    if no_dotdot(value) && REF_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Metadata {
            field: "ref",
            value: value.to_string(),
        })
    }
}

/// Validate `metadata.Origin.Hash`: `^[0-9a-f]{{40}}$`.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] otherwise.
pub fn validate_hash(value: &str) -> Result<(), ValidationError> {
    if HASH_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Metadata {
            field: "hash",
            value: value.to_string(),
        })
    }
}

/// Validate `metadata.Origin.Subdir`: `^[a-z0-9/]+$`. Empty is accepted.
///
/// # Errors
///
/// Returns [`ValidationError::Metadata`] otherwise.
pub fn validate_subdir(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || SUBDIR_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::Metadata {
            field: "subdir",
            value: value.to_string(),
        })
    }
}
