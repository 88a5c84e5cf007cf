//! Shared identity types and validators for the gofer trust pipeline.
//!
//! This crate defines the vocabulary that every other `gofer-*` crate builds
//! on: the validated newtypes for module names, versions, and `h1:` checksums,
//! the artifact-kind enum, the fixed-width regex validators for metadata
//! fields, and the case-folding escape used by the native cache layout. None
//! of this crate touches the filesystem or the network.

/// Case-folded path escaping for the native cache layout.
pub mod escape;
/// The artifact-kind enum shared by every artifact-facing crate.
pub mod kind;
/// Validated module name newtype.
pub mod name;
/// Field-level syntactic validators (`§4.B`) and the shared error type.
pub mod validate;
/// Validated `h1:` checksum newtype.
pub mod checksum;
/// Validated module version newtype.
pub mod version;

pub use checksum::Checksum;
pub use kind::ArtifactKind;
pub use name::ModuleName;
pub use validate::ValidationError;
pub use version::ModuleVersion;
