//! Read + verify a signed blob from a synchronous source.

use std::io::{self, Cursor, Read};

use crate::envelope;
use crate::error::BlobError;
use crate::keyring::PublicKey;
use crate::options::Options;

/// A verified payload, readable via [`std::io::Read`].
///
/// Construction ([`Reader::new`]) reads the entire envelope, checks its blob
/// type, verifies the embedded signature, and confirms the signer is
/// trusted; by the time a `Reader` exists, `Read`ing from it yields payload
/// bytes that have already passed every check `§6` requires.
pub struct Reader {
    payload: Cursor<Vec<u8>>,
}

impl Reader {
    /// Read and verify a complete envelope from `source`, checking it
    /// against `opts`.
    ///
    /// Returns the verified reader together with the envelope's signer, so
    /// callers can record provenance (the Go original's `blobber.Signer`
    /// field) without re-parsing the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::TypeMismatch`] if the envelope's blob type does
    /// not match `opts.blob_type`, [`BlobError::Signature`] if the signature
    /// does not verify or the signer is untrusted, or a [`BlobError::Io`] /
    /// [`BlobError::Malformed`] if `source` cannot be read or framed.
    pub fn new(mut source: impl Read, opts: &Options) -> Result<(Self, PublicKey), BlobError> {
        let mut raw = Vec::new();
        source.read_to_end(&mut raw)?;
        let envelope = envelope::decode(&raw)?;

        if envelope.blob_type != opts.blob_type {
            return Err(BlobError::TypeMismatch {
                expected: opts.blob_type.clone(),
                actual: envelope.blob_type,
            });
        }
        envelope.verify_self_consistent()?;
        if !opts.keyring.is_trusted(envelope.signer) {
            return Err(BlobError::Signature(format!(
                "signer {} is not in the trusted keyring",
                envelope.signer
            )));
        }

        let signer = envelope.signer;
        Ok((
            Self {
                payload: Cursor::new(envelope.payload),
            },
            signer,
        ))
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.payload.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::{Keyring, SigningIdentity};
    use ed25519_dalek::SigningKey as DalekSigningKey;

    fn signed_envelope(blob_type: &str, payload: &[u8], key: &DalekSigningKey) -> Vec<u8> {
        envelope::encode(blob_type, payload, key)
    }

    #[test]
    fn rejects_untrusted_signer() {
        let stranger = SigningIdentity::generate();
        let bytes = signed_envelope("gofer.source", b"data", &stranger.0);

        let owner = SigningIdentity::generate();
        let keyring = Keyring::with_identity(vec![], owner);
        let opts = Options::signing_only("gofer.source", keyring);

        let err = Reader::new(bytes.as_slice(), &opts).unwrap_err();
        assert!(matches!(err, BlobError::Signature(_)));
    }

    #[test]
    fn rejects_type_mismatch() {
        let owner = SigningIdentity::generate();
        let bytes = signed_envelope("gofer.descriptor", b"data", &owner.0);

        let keyring = Keyring::with_identity(vec![], owner);
        let opts = Options::signing_only("gofer.source", keyring);

        let err = Reader::new(bytes.as_slice(), &opts).unwrap_err();
        assert!(matches!(err, BlobError::TypeMismatch { .. }));
    }
}
