//! The error type shared by every operation in this crate.

use thiserror::Error;

/// Errors raised by the signed-blob codec.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Filesystem or network I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote network request failed (excluding a plain 404).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The envelope was truncated, malformed, or its magic bytes didn't match.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The signature did not verify, or the signer is not in the trusted set.
    #[error("signature verification failed: {0}")]
    Signature(String),

    /// The envelope's blob type did not match the caller's expected type.
    #[error("blob type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        /// The type the caller asked for.
        expected: String,
        /// The type recorded in the envelope.
        actual: String,
    },

    /// `Options::encrypted` was set to `true`; this codec never encrypts.
    #[error("encryption is not supported by this codec")]
    EncryptionUnsupported,

    /// The caller requested signing but the keyring carries no signing identity.
    #[error("keyring has no signing identity")]
    NoSigningIdentity,

    /// The remote object does not exist (HTTP 404 or equivalent).
    #[error("remote object not found: {0}")]
    NotFound(String),
}
