//! One module per subcommand, mirroring the teacher's `cmd/` layout.

pub mod cachedir;
pub mod get;
pub mod keygen;
pub mod sign;
pub mod verify;
