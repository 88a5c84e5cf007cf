//! Configuration loading: a flat `Config` loaded from TOML at
//! `$GOFER_HOME/config.toml`, with an optional `[profile.<name>]` table
//! flat-merged over the root (`§4.I`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default mirror used when a config omits `mirror_base_url`.
const DEFAULT_MIRROR_BASE_URL: &str = "https://proxy.gofer.example/mirror";

/// Fixed production concurrency ceiling (`§5`): not operator-tunable, only
/// overridable in a config file meant for test fixtures.
const DEFAULT_CONCURRENCY: usize = 3;

/// Every field a config file may set, each optional so a profile overlay can
/// name only the fields it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    native_cache_root: Option<PathBuf>,
    sig_root: Option<PathBuf>,
    mirror_base_url: Option<String>,
    keyring_path: Option<PathBuf>,
    concurrency: Option<usize>,
    #[serde(default)]
    profile: HashMap<String, RawConfig>,
}

impl RawConfig {
    /// Overwrite fields present in `overlay`, per `§4.I`'s flat merge — a
    /// profile table is never itself treated as a base for further
    /// profiles.
    fn merged_with(mut self, overlay: &RawConfig) -> Self {
        if overlay.native_cache_root.is_some() {
            self.native_cache_root = overlay.native_cache_root.clone();
        }
        if overlay.sig_root.is_some() {
            self.sig_root = overlay.sig_root.clone();
        }
        if overlay.mirror_base_url.is_some() {
            self.mirror_base_url = overlay.mirror_base_url.clone();
        }
        if overlay.keyring_path.is_some() {
            self.keyring_path = overlay.keyring_path.clone();
        }
        if overlay.concurrency.is_some() {
            self.concurrency = overlay.concurrency;
        }
        self
    }
}

/// Resolved configuration handed to every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    /// Native-cache root `G` (`§3`).
    pub native_cache_root: PathBuf,
    /// Signature-store root `S` (`§3`).
    pub sig_root: PathBuf,
    /// Base URL the mirror is fetched from for `gofer get`.
    pub mirror_base_url: String,
    /// Path to the keyring file (trusted signers, and this process's own
    /// signing identity if present).
    pub keyring_path: PathBuf,
    /// Download concurrency ceiling; fixed at 3 outside test fixtures.
    pub concurrency: usize,
}

impl Config {
    /// Load `$gofer_home/config.toml`, applying `profile`'s overlay (if
    /// named and present), and falling back to `gofer_home`-relative
    /// defaults for any field the file leaves unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid TOML, or if a
    /// named `profile` is not present in the file's `[profile.<name>]`
    /// table. `config_path` overrides the default `gofer_home/config.toml`
    /// lookup when given (the CLI's `--config` flag).
    pub fn load(gofer_home: &Path, config_path: Option<&Path>, profile: Option<&str>) -> Result<Self> {
        let config_path = config_path.map_or_else(|| gofer_home.join("config.toml"), Path::to_path_buf);
        let raw = if config_path.exists() {
            let text = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            toml::from_str::<RawConfig>(&text)
                .with_context(|| format!("parsing {}", config_path.display()))?
        } else {
            RawConfig::default()
        };

        let resolved = match profile {
            Some(name) => {
                let overlay = raw
                    .profile
                    .get(name)
                    .with_context(|| format!("no [profile.{name}] in {}", config_path.display()))?
                    .clone();
                raw.clone().merged_with(&overlay)
            }
            None => raw,
        };

        Ok(Self {
            native_cache_root: resolved
                .native_cache_root
                .unwrap_or_else(|| gofer_home.join("pkg/mod/cache/download")),
            sig_root: resolved.sig_root.unwrap_or_else(|| gofer_home.join("sig")),
            mirror_base_url: resolved
                .mirror_base_url
                .unwrap_or_else(|| DEFAULT_MIRROR_BASE_URL.to_string()),
            keyring_path: resolved
                .keyring_path
                .unwrap_or_else(|| gofer_home.join("keyring.toml")),
            concurrency: resolved.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
        })
    }
}

/// The default `$GOFER_HOME`: `$GOFER_HOME` if set, else `~/.gofer`.
///
/// # Errors
///
/// Returns an error if `$GOFER_HOME` is unset and the home directory
/// cannot be determined.
pub fn default_gofer_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("GOFER_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|h| h.join(".gofer"))
        .context("could not determine home directory; set GOFER_HOME")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_no_config_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), None, None).unwrap();
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.native_cache_root, dir.path().join("pkg/mod/cache/download"));
    }

    #[test]
    fn profile_overlays_only_named_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
            mirror_base_url = "https://root.example/mirror"
            concurrency = 3

            [profile.ci]
            concurrency = 1
            "#,
        )
        .unwrap();

        let config = Config::load(dir.path(), None, Some("ci")).unwrap();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.mirror_base_url, "https://root.example/mirror");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        assert!(Config::load(dir.path(), None, Some("missing")).is_err());
    }
}
