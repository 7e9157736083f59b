//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::Parser;

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::domain::error::DeployError;
use crate::domain::mode::RunMode;

/// Build, publish and launch the dockhand gateway container
///
/// Without flags: build and push the image, run onboarding, start the gateway.
/// Settings come from DOCKHAND_* environment variables and are saved to .env
/// in the project directory on every run.
#[derive(Parser, Debug)]
#[command(name = "dockhand", version)]
pub struct Cli {
    /// Build and push the image, then stop
    #[arg(short = 'b', long, conflicts_with = "run_only")]
    pub build_only: bool,

    /// Pull the published image and launch it without building
    #[arg(short = 'r', long)]
    pub run_only: bool,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Execute the deploy flow selected by the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode is invalid, configuration cannot be
    /// resolved, or any deploy step fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            build_only,
            run_only,
            quiet,
            no_color,
        } = self;
        let mode = RunMode::from_flags(build_only, run_only)?;
        let app = AppContext::new(&OutputFlags { no_color, quiet })?;
        commands::deploy::run(mode, &app).await
    }
}

/// Process exit code for an error returned by [`Cli::run`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<DeployError>())
        .map_or(1, DeployError::exit_code)
}
