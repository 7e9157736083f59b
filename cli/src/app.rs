//! Application context — unified state passed to the command handler.
//!
//! `AppContext` is built once in `Cli::run()` from the top-level flags and
//! the environment; every component receives its configuration from here
//! instead of reading process-wide variables itself.

use anyhow::Result;

use crate::domain::config::DeployConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{load_deploy_config, overrides_from_env};
use crate::infra::env_file::EnvFileStore;
use crate::infra::fs::LocalFs;
use crate::output::{OutputContext, TerminalReporter};

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Unified application context passed to the command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Resolved configuration for this invocation.
    pub config: DeployConfig,
    /// Process runner for `docker`.
    pub runner: TokioCommandRunner,
    /// Project `.env` settings file.
    pub store: EnvFileStore,
    /// Local filesystem.
    pub fs: LocalFs,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be resolved (home
    /// directory not found, unreadable `.env`, invalid port override).
    pub fn new(flags: &OutputFlags) -> Result<Self> {
        let config = load_deploy_config(overrides_from_env()?)?;
        tracing::debug!(
            project_dir = %config.project_dir.display(),
            image = %config.image,
            "configuration resolved"
        );
        Ok(Self::with_config(flags, config))
    }

    /// Construct an `AppContext` around an already resolved configuration.
    #[must_use]
    pub fn with_config(flags: &OutputFlags, config: DeployConfig) -> Self {
        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            store: EnvFileStore::new(config.env_file()),
            config,
            runner: TokioCommandRunner,
            fs: LocalFs,
        }
    }

    /// Progress reporter writing to the terminal.
    #[must_use]
    pub fn terminal_reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
