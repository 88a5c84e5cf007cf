//! The error type shared by every operation this crate exposes.

use thiserror::Error;

/// Every failure mode the trust pipeline distinguishes (`§7`).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A string failed its validator (name, version, checksum, URL, path, time, ...).
    #[error("validation failed: {0}")]
    Validation(#[from] gofer_schema::ValidationError),

    /// A computed hash differs from the declared one.
    #[error("checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Display name of the artifact whose hash was checked.
        artifact: String,
        /// The checksum recorded in the manifest.
        expected: String,
        /// The checksum actually computed.
        actual: String,
    },

    /// Strict JSON decode or field validation failed.
    #[error("schema error in {artifact}: {detail}")]
    Schema {
        /// Display name of the artifact being parsed.
        artifact: String,
        /// What failed.
        detail: String,
    },

    /// The signed-blob reader rejected the envelope.
    #[error("signature error: {0}")]
    Signature(#[from] gofer_blob::BlobError),

    /// The remote artifact does not exist. Tolerated for Metadata only.
    #[error("not found: {0}")]
    NotFound(String),

    /// A filesystem or network operation failed other than not-found.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal invariant was violated.
    #[error("state error: {0}")]
    State(String),

    /// The independent H1 sanity-check recomputation disagreed with the
    /// primary computation, or a `len == 47` constraint failed.
    #[error("internal bug: {0}")]
    InternalBug(String),
}

/// Convenience alias used throughout this crate.
pub type CoreResult<T> = Result<T, CoreError>;
