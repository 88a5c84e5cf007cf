//! gofer - trust-enforcing cache manager CLI.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gofer_core::reporter::{LineReporter, NullReporter, Reporter};
use tracing_subscriber::EnvFilter;

use gofer_cli::config::Config;
use gofer_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    let gofer_home = match &cli.gofer_home {
        Some(path) => path.clone(),
        None => gofer_cli::config::default_gofer_home()?,
    };
    let config = Config::load(&gofer_home, cli.config.as_deref(), cli.profile.as_deref())?;

    let reporter: Arc<dyn Reporter> = if cli.quiet {
        Arc::new(NullReporter)
    } else {
        Arc::new(LineReporter::new())
    };

    match cli.command {
        Commands::Verify { manifests } => gofer_cli::cmd::verify::run(&config, reporter, &manifests),
        Commands::Sign { manifests } => gofer_cli::cmd::sign::run(&config, reporter, &manifests),
        Commands::Get { manifests } => gofer_cli::cmd::get::run(&config, reporter, &manifests).await,
        Commands::Cachedir { tree, out } => gofer_cli::cmd::cachedir::run(&tree, &out),
        Commands::Keygen => gofer_cli::cmd::keygen::run(),
    }
}
