//! The trust pipeline: H1 content hashing, artifact parsing and modelling,
//! the signature store, and the cache reconciler that keeps the signature
//! store, the native module cache, and the project manifest mutually
//! consistent.
//!
//! This crate performs no CLI argument parsing, configuration loading, or
//! presentation; `gofer-cli` wires it to the outside world.

/// Canonical archive creation from a directory tree.
pub mod archive;
/// The artifact model: `Source`/`Descriptor`/`Metadata`, their path-naming
/// policy, and the typestate that distinguishes unverified from verified
/// artifacts at compile time.
pub mod artifact;
/// Shared error type.
pub mod error;
/// The canonical content-hash algorithm ("H1").
pub mod h1;
/// Local-cache minting: synthesise a pseudo-version from a working tree.
pub mod mint;
/// Strict parsing of manifests, descriptors, and metadata records.
pub mod parse;
/// The cache reconciler: download/verify/install and garbage collection.
pub mod reconcile;
/// Diagnostic and user-facing progress reporting.
pub mod reporter;
/// The content-addressed signature store.
pub mod store;

pub use error::{CoreError, CoreResult};
