//! gofer - a trust-enforcing cache manager for a Go-module-style
//! distribution ecosystem.
//!
//! This crate owns argument parsing, configuration, and presentation; the
//! trust pipeline itself (hashing, parsing, the signature store, the cache
//! reconciler) lives in `gofer-core`, which this crate performs no
//! hashing, parsing, or I/O of its own beyond wiring into.

pub mod cmd;
pub mod config;
pub mod context;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `gofer` - trust-enforcing cache manager.
#[derive(Debug, Parser)]
#[command(name = "gofer")]
#[command(author, version, about = "Trust-enforcing cache manager for module distribution", long_about = None)]
pub struct Cli {
    /// Suppress per-artifact progress lines.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override `$GOFER_HOME` (default: `~/.gofer`).
    #[arg(long, global = true, value_name = "PATH")]
    pub gofer_home: Option<PathBuf>,

    /// Load configuration from this file instead of `$GOFER_HOME/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Name of a `[profile.<name>]` table to flat-merge over the root config.
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Verify every artifact a manifest implies, offline (`§4.F1`).
    Verify {
        /// Checksum manifest file(s) to read.
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Verify the native cache, then sign each artifact into the signature
    /// store (`§4.F2`).
    Sign {
        /// Checksum manifest file(s) to read.
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Download, verify, and install every artifact a manifest implies
    /// (`§4.F3`).
    Get {
        /// Checksum manifest file(s) to read.
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Mint a pseudo-versioned cache entry from a local git working tree
    /// (`§4.G`).
    Cachedir {
        /// The working tree to mint from.
        tree: PathBuf,
        /// Native-cache root to install the minted entry under.
        out: PathBuf,
    },
    /// Generate a new Ed25519 signing keypair.
    Keygen,
}
