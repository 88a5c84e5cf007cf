//! A minimal signed-blob container.
//!
//! `gofer-core` treats this crate as an opaque external collaborator and only
//! ever calls [`Writer::new`], [`Reader::new`], and [`download`] — the three
//! narrow operations described in `§6` of the specification. No published
//! crate implements this exact envelope, so this crate provides a small,
//! real one: an Ed25519 signature over `type || payload`, framed behind a
//! fixed-size header. There is no encryption path because the core always
//! passes `encrypted: false`; [`Options::encrypted`] exists only so the
//! call sites read the same as the specification's narrow interface, and
//! constructing it with `true` is rejected.

/// The wire envelope: header layout, encode/decode.
mod envelope;
/// Remote fetch of a signed envelope.
mod fetch;
/// The error type shared by every operation in this crate.
mod error;
/// Trusted signer set and local signing identity.
mod keyring;
/// `Options` controlling blob type, keyring, and the (always-off) encryption flag.
mod options;
/// Read + verify a locally-stored signed blob.
mod reader;
/// Sign + write a payload as a signed blob.
mod writer;

pub use error::BlobError;
pub use fetch::download;
pub use keyring::{Keyring, PublicKey, SigningIdentity};
pub use options::Options;
pub use reader::Reader;
pub use writer::Writer;
