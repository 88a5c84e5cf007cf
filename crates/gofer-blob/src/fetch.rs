//! Remote fetch of a signed envelope.

use futures::StreamExt;
use reqwest::{Client, StatusCode};

use crate::envelope;
use crate::error::BlobError;
use crate::keyring::PublicKey;
use crate::options::Options;

/// Download a complete envelope from `uri`, verify it against `opts`, and
/// return the raw envelope bytes (as fetched, suitable for staging directly
/// into a signature store) together with the verified payload and signer.
///
/// Mirrors `blob.Download` in the original `go-cryptor` client: a plain GET
/// of the whole object (these blobs are metadata-sized, not archive-sized)
/// followed by the same type/signature/trust checks [`crate::Reader`]
/// performs on a local file.
///
/// # Errors
///
/// Returns [`BlobError::NotFound`] on an HTTP 404, [`BlobError::Network`] for
/// any other transport failure, and the same framing/signature errors as
/// [`crate::Reader::new`] once the body has been fetched.
pub async fn download(
    client: &Client,
    uri: &str,
    opts: &Options,
) -> Result<(Vec<u8>, Vec<u8>, PublicKey), BlobError> {
    let response = client.get(uri).send().await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(BlobError::NotFound(uri.to_string()));
    }
    let response = response.error_for_status()?;

    let mut raw = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        raw.extend_from_slice(&chunk?);
    }

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
    Ok((raw, envelope.payload, signer))
}
