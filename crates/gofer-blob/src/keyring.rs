//! Trusted signer set and local signing identity.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use ed25519_dalek::{SigningKey, VerifyingKey};

/// An Ed25519 public key, displayed as base64 (the form the CLI's `keygen`
/// subcommand prints and the form operators paste into configuration).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) VerifyingKey);

impl PublicKey {
    /// Parse a base64-encoded 32-byte Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns an error string if the input is not valid base64 or not
    /// exactly 32 bytes, or not a valid Ed25519 point.
    pub fn from_base64(s: &str) -> Result<Self, String> {
        let bytes = BASE64
            .decode(s.trim())
            .map_err(|e| format!("invalid base64 public key: {e}"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "public key must be exactly 32 bytes".to_string())?;
        let key = VerifyingKey::from_bytes(&arr).map_err(|e| format!("invalid public key: {e}"))?;
        Ok(Self(key))
    }

    /// Encode as base64.
    pub fn to_base64(self) -> String {
        BASE64.encode(self.0.to_bytes())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64())
    }
}

/// A local Ed25519 signing identity, used by [`crate::Writer`].
#[derive(Clone)]
pub struct SigningIdentity(pub(crate) SigningKey);

impl SigningIdentity {
    /// Parse a base64-encoded 32-byte Ed25519 private key.
    ///
    /// # Errors
    ///
    /// Returns an error string if the input is not valid base64 or not
    /// exactly 32 bytes.
    pub fn from_base64(s: &str) -> Result<Self, String> {
        let bytes = BASE64
            .decode(s.trim())
            .map_err(|e| format!("invalid base64 signing key: {e}"))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| "signing key must be exactly 32 bytes".to_string())?;
        Ok(Self(SigningKey::from_bytes(&arr)))
    }

    /// Generate a fresh random signing identity.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self(SigningKey::generate(&mut rng))
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Encode the private key as base64. Callers are responsible for storing
    /// this securely; it is never logged by this crate.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0.to_bytes())
    }
}

/// The read-only, shared set of trusted signers plus (optionally) this
/// process's own signing identity.
///
/// Mirrors the "keyring" of `§6`: [`crate::Reader`] checks a signature
/// against [`Keyring::trusted`]; [`crate::Writer`] signs with
/// [`Keyring::identity`] if present.
#[derive(Clone, Default)]
pub struct Keyring {
    trusted: Vec<PublicKey>,
    identity: Option<SigningIdentity>,
}

impl Keyring {
    /// Build a keyring that can only verify (no local signing identity).
    pub fn verify_only(trusted: Vec<PublicKey>) -> Self {
        Self {
            trusted,
            identity: None,
        }
    }

    /// Build a keyring that can both sign and verify. `identity`'s public
    /// key is implicitly added to the trusted set so a process can verify
    /// blobs it just signed.
    pub fn with_identity(trusted: Vec<PublicKey>, identity: SigningIdentity) -> Self {
        let mut trusted = trusted;
        let own = identity.public_key();
        if !trusted.contains(&own) {
            trusted.push(own);
        }
        Self {
            trusted,
            identity: Some(identity),
        }
    }

    /// The local signing identity, if this keyring can sign.
    pub fn identity(&self) -> Option<&SigningIdentity> {
        self.identity.as_ref()
    }

    /// Whether `key` is a trusted signer.
    pub fn is_trusted(&self, key: PublicKey) -> bool {
        self.trusted.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trip() {
        let id = SigningIdentity::generate();
        let encoded = id.to_base64();
        let decoded = SigningIdentity::from_base64(&encoded).unwrap();
        assert_eq!(decoded.public_key(), id.public_key());
    }

    #[test]
    fn with_identity_implicitly_trusts_self() {
        let id = SigningIdentity::generate();
        let keyring = Keyring::with_identity(vec![], id.clone());
        assert!(keyring.is_trusted(id.public_key()));
    }
}
