//! `gofer keygen` -- generate an Ed25519 signing keypair for the signed-blob
//! codec, mirroring the teacher's `apl-pkg keygen` subcommand.

use anyhow::Result;
use gofer_blob::SigningIdentity;

/// Generate a fresh Ed25519 keypair and print both halves as base64.
///
/// # Errors
///
/// Never fails; returns `Result` for consistency with the other
/// subcommands.
pub fn run() -> Result<()> {
    let identity = SigningIdentity::generate();
    let public = identity.public_key();

    println!("secret (keep safe, add to keyring.toml's `identity`):");
    println!("{}", identity.to_base64());
    println!();
    println!("public (share with verifiers, add to keyring.toml's `trusted`):");
    println!("{public}");
    Ok(())
}
