//! `Options` controlling blob type, keyring, and the (always-off) encryption flag.

use crate::keyring::Keyring;

/// Options shared by [`crate::Writer::new`], [`crate::Reader::new`], and
/// [`crate::download`].
///
/// Mirrors `§6`'s `{type, keyring, encrypted}` record exactly.
#[derive(Clone)]
pub struct Options {
    /// The product name every envelope is tagged with; a mismatch on read is
    /// a [`crate::BlobError::TypeMismatch`].
    pub blob_type: String,
    /// The shared keyring.
    pub keyring: Keyring,
    /// Must be `false`. This codec has no encryption path.
    pub encrypted: bool,
}

impl Options {
    /// Construct options for signing-only use (the only mode the core ever
    /// requests).
    pub fn signing_only(blob_type: impl Into<String>, keyring: Keyring) -> Self {
        Self {
            blob_type: blob_type.into(),
            keyring,
            encrypted: false,
        }
    }
}
