//! Dockhand - build, publish and launch the gateway container on a host

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dockhand_cli::cli::{Cli, exit_code};
use dockhand_cli::output::OutputContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let no_color = cli.no_color;
    if let Err(e) = cli.run().await {
        OutputContext::new(no_color, false).error(&format!("Error: {e:#}"));
        std::process::exit(exit_code(&e));
    }
}
