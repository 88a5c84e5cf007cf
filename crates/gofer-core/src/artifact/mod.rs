//! The artifact model: three kinds, their path-naming policy, and the
//! typestate distinguishing unverified from verified artifacts. `§4.D`.

mod identity;
mod kind;
mod state;

pub use identity::Identity;
pub use kind::{DescriptorKind, Kind, MetadataKind, SourceKind};
pub use state::{Unverified, Verified};
