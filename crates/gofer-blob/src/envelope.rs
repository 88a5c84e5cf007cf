//! The wire envelope: header layout, encode/decode.
//!
//! ```text
//! MAGIC(4) || type_len(u16 LE) || type(type_len) || signer_pubkey(32) || signature(64) || payload(..)
//! ```
//!
//! The signature covers `type || payload`, binding the declared blob type to
//! its content so a Source envelope can never be replayed as a Descriptor.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::BlobError;
use crate::keyring::PublicKey;

const MAGIC: &[u8; 4] = b"GPK1";
const PUBKEY_LEN: usize = 32;
const SIG_LEN: usize = 64;

/// A decoded (but not yet keyring-checked) envelope.
pub struct Envelope {
    pub blob_type: String,
    pub signer: PublicKey,
    signature: Signature,
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Verify the embedded signature against the embedded signer key. This
    /// proves internal consistency (the envelope wasn't bit-flipped) but not
    /// that the signer is *trusted* — callers must additionally check
    /// [`crate::Keyring::is_trusted`].
    pub fn verify_self_consistent(&self) -> Result<(), BlobError> {
        let mut signed_over = Vec::with_capacity(self.blob_type.len() + self.payload.len());
        signed_over.extend_from_slice(self.blob_type.as_bytes());
        signed_over.extend_from_slice(&self.payload);

        self.signer
            .0
            .verify(&signed_over, &self.signature)
            .map_err(|e| BlobError::Signature(e.to_string()))
    }
}

/// Encode a signed envelope for `blob_type`/`payload` using `identity`.
pub fn encode(blob_type: &str, payload: &[u8], identity: &SigningKey) -> Vec<u8> {
    let mut signed_over = Vec::with_capacity(blob_type.len() + payload.len());
    signed_over.extend_from_slice(blob_type.as_bytes());
    signed_over.extend_from_slice(payload);
    let signature = identity.sign(&signed_over);

    let type_bytes = blob_type.as_bytes();
    let mut out = Vec::with_capacity(
        MAGIC.len() + 2 + type_bytes.len() + PUBKEY_LEN + SIG_LEN + payload.len(),
    );
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&(type_bytes.len() as u16).to_le_bytes());
    out.extend_from_slice(type_bytes);
    out.extend_from_slice(&identity.verifying_key().to_bytes());
    out.extend_from_slice(&signature.to_bytes());
    out.extend_from_slice(payload);
    out
}

/// Decode an envelope from raw bytes, checking framing but not yet the
/// signature's validity (see [`Envelope::verify_self_consistent`]).
pub fn decode(data: &[u8]) -> Result<Envelope, BlobError> {
    if data.len() < MAGIC.len() + 2 {
        return Err(BlobError::Malformed("envelope shorter than header".into()));
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(BlobError::Malformed("bad magic bytes".into()));
    }
    let mut offset = MAGIC.len();

    let type_len = u16::from_le_bytes([data[offset], data[offset + 1]]) as usize;
    offset += 2;

    let need = offset + type_len + PUBKEY_LEN + SIG_LEN;
    if data.len() < need {
        return Err(BlobError::Malformed("envelope truncated".into()));
    }

    let blob_type = std::str::from_utf8(&data[offset..offset + type_len])
        .map_err(|e| BlobError::Malformed(format!("blob type is not UTF-8: {e}")))?
        .to_string();
    offset += type_len;

    let pubkey_bytes: [u8; PUBKEY_LEN] = data[offset..offset + PUBKEY_LEN]
        .try_into()
        .expect("slice length checked above");
    offset += PUBKEY_LEN;
    let signer = VerifyingKey::from_bytes(&pubkey_bytes)
        .map_err(|e| BlobError::Malformed(format!("invalid signer public key: {e}")))?;

    let sig_bytes: [u8; SIG_LEN] = data[offset..offset + SIG_LEN]
        .try_into()
        .expect("slice length checked above");
    offset += SIG_LEN;
    let signature = Signature::from_bytes(&sig_bytes);

    let payload = data[offset..].to_vec();

    Ok(Envelope {
        blob_type,
        signer: PublicKey(signer),
        signature,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    #[test]
    fn round_trips() {
        let mut rng = rand::rng();
        let key = SigningKey::generate(&mut rng);
        let bytes = encode("gofer.source", b"hello world", &key);

        let envelope = decode(&bytes).unwrap();
        assert_eq!(envelope.blob_type, "gofer.source");
        assert_eq!(envelope.payload, b"hello world");
        envelope.verify_self_consistent().unwrap();
    }

    #[test]
    fn detects_tampering() {
        let mut rng = rand::rng();
        let key = SigningKey::generate(&mut rng);
        let mut bytes = encode("gofer.source", b"hello world", &key);
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let envelope = decode(&bytes).unwrap();
        assert!(envelope.verify_self_consistent().is_err());
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(decode(b"NOPE").is_err());
    }
}
