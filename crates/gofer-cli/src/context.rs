//! Wiring configuration into the `gofer-core` `Context` the store and
//! reconciler operations take (`§4.H`'s "performs no hashing, parsing, or
//! I/O of its own beyond wiring").

use std::sync::Arc;

use anyhow::{Context as _, Result};
use gofer_blob::{Keyring, PublicKey, SigningIdentity};
use gofer_core::store::Context;
use serde::Deserialize;

use crate::config::Config;

/// On-disk shape of the keyring file: a list of trusted signer public keys,
/// plus this process's own signing identity if it can sign.
#[derive(Debug, Deserialize, Default)]
struct KeyringFile {
    #[serde(default)]
    trusted: Vec<String>,
    identity: Option<String>,
}

/// Load the keyring named by `config.keyring_path`. A missing file yields an
/// empty, verify-only keyring (useful for `gofer verify` against a
/// pre-populated signature store with no local trust roots configured yet).
fn load_keyring(path: &std::path::Path) -> Result<Keyring> {
    if !path.exists() {
        return Ok(Keyring::verify_only(Vec::new()));
    }
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: KeyringFile = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let trusted = file
        .trusted
        .iter()
        .map(|s| PublicKey::from_base64(s).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;

    match file.identity {
        Some(secret) => {
            let identity = SigningIdentity::from_base64(&secret).map_err(anyhow::Error::msg)?;
            Ok(Keyring::with_identity(trusted, identity))
        }
        None => Ok(Keyring::verify_only(trusted)),
    }
}

/// Build the `gofer-core` store `Context` a subcommand drives: the native
/// cache root, signature store root, keyring, product blob type, a fresh
/// `reqwest::Client`, and the configured concurrency ceiling.
///
/// # Errors
///
/// Returns an error if the keyring file exists but is not valid TOML or
/// contains a malformed key, or if the HTTP client cannot be built.
pub fn build(config: &Config) -> Result<Context> {
    let keyring = load_keyring(&config.keyring_path)?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("gofer/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    Ok(Context {
        go_path: config.native_cache_root.clone(),
        sig_root: config.sig_root.clone(),
        keyring: Arc::new(keyring),
        blob_type: "gofer.module".to_string(),
        client,
        concurrency: config.concurrency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keyring_file_is_verify_only_empty() {
        let dir = tempfile::tempdir().unwrap();
        let keyring = load_keyring(&dir.path().join("keyring.toml")).unwrap();
        assert!(!keyring.is_trusted(SigningIdentity::generate().public_key()));
    }

    #[test]
    fn identity_round_trips_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let identity = SigningIdentity::generate();
        std::fs::write(
            dir.path().join("keyring.toml"),
            format!("identity = \"{}\"\n", identity.to_base64()),
        )
        .unwrap();

        let keyring = load_keyring(&dir.path().join("keyring.toml")).unwrap();
        assert!(keyring.is_trusted(identity.public_key()));
        assert!(keyring.identity().is_some());
    }
}
