//! Sign + write a payload as a signed blob.

use std::io::{self, Write};

use crate::envelope;
use crate::error::BlobError;
use crate::options::Options;

/// Buffers a payload in memory and, on [`Writer::close`], signs it and
/// writes the resulting envelope to the sink given at construction.
///
/// The payload for a single artifact (at most a `100 MiB` source archive,
/// per `§4.A`) is small enough that buffering in memory before signing is
/// the simplest correct implementation; streaming a signature would require
/// either a two-pass design or an incremental-signature scheme, neither of
/// which this narrow interface calls for.
pub struct Writer<W: Write> {
    sink: W,
    blob_type: String,
    identity_bytes: Option<[u8; 32]>,
    buffer: Vec<u8>,
    closed: bool,
}

impl<W: Write> Writer<W> {
    /// Open a writer around `sink` using `opts`.
    ///
    /// # Errors
    ///
    /// Returns [`BlobError::EncryptionUnsupported`] if `opts.encrypted` is
    /// `true`, or [`BlobError::NoSigningIdentity`] if the keyring carries no
    /// signing identity.
    pub fn new(sink: W, opts: &Options) -> Result<Self, BlobError> {
        if opts.encrypted {
            return Err(BlobError::EncryptionUnsupported);
        }
        let identity = opts.keyring.identity().ok_or(BlobError::NoSigningIdentity)?;
        Ok(Self {
            sink,
            blob_type: opts.blob_type.clone(),
            identity_bytes: Some(identity.0.to_bytes()),
            buffer: Vec::new(),
            closed: false,
        })
    }

    /// Sign the buffered payload and flush the envelope to the sink.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if writing to the sink fails.
    pub fn close(mut self) -> Result<(), BlobError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), BlobError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let key_bytes = self
            .identity_bytes
            .take()
            .expect("identity_bytes set at construction");
        let identity = ed25519_dalek::SigningKey::from_bytes(&key_bytes);
        let envelope = envelope::encode(&self.blob_type, &self.buffer, &identity);
        self.sink.write_all(&envelope)?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::{Keyring, SigningIdentity};
    use crate::reader::Reader;

    #[test]
    fn writer_then_reader_round_trips() {
        let identity = SigningIdentity::generate();
        let keyring = Keyring::with_identity(vec![], identity);
        let opts = Options::signing_only("gofer.test", keyring);

        let mut buf = Vec::new();
        {
            let mut writer = Writer::new(&mut buf, &opts).unwrap();
            writer.write_all(b"payload bytes").unwrap();
            writer.close().unwrap();
        }

        let (mut reader, signer) = Reader::new(buf.as_slice(), &opts).unwrap();
        let mut out = Vec::new();
        std::io::copy(&mut reader, &mut out).unwrap();
        assert_eq!(out, b"payload bytes");
        assert!(opts.keyring.is_trusted(signer));
    }

    #[test]
    fn rejects_encrypted_option() {
        let identity = SigningIdentity::generate();
        let keyring = Keyring::with_identity(vec![], identity);
        let mut opts = Options::signing_only("gofer.test", keyring);
        opts.encrypted = true;

        let buf: Vec<u8> = Vec::new();
        let err = Writer::new(buf, &opts).unwrap_err();
        assert!(matches!(err, BlobError::EncryptionUnsupported));
    }
}
