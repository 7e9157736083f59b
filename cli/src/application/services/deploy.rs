//! Application service — deploy use-case.
//!
//! Drives one invocation from validated mode to a started gateway:
//!
//! ```text
//! dependencies → directories → overlay → persist settings
//!   → [build phase: auth → build → push]   (unless run-only)
//!   → [pull]                               (run-only)
//!   → onboard → start                      (unless build-only)
//! ```
//!
//! Every step waits for the previous one. Nothing is retried; a failing
//! external command ends the run with its exit status. Settings are persisted
//! before any phase so a failed run never loses the operator's configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{
    CommandRunner, ConfigStore, CredentialCheck, LocalFs, ProgressReporter,
};
use crate::application::services::registry_auth::RegistryAuthChecker;
use crate::domain::config::{DeployConfig, KEY_APT_PACKAGES};
use crate::domain::error::DeployError;
use crate::domain::mode::RunMode;
use crate::domain::overlay::{self, CLI_SERVICE, GATEWAY_SERVICE, OVERLAY_FILE};

/// Container runtime / orchestrator binary.
pub const DOCKER: &str = "docker";

/// Result of a successful deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Build-only run: image built and pushed.
    Built { image: String },
    /// Gateway started in the background.
    Started {
        image: String,
        /// Compose invocation prefix for follow-up commands, e.g.
        /// `docker compose -f docker-compose.yml`.
        compose: String,
        /// Overlay file passed to compose, if one was written.
        overlay: Option<PathBuf>,
    },
}

/// Run the deploy flow for `mode` with the resolved `config`.
///
/// # Errors
///
/// * [`DeployError::MissingDependency`] if `docker` or `docker compose` is absent.
/// * [`DeployError::RegistryAuth`] if the build phase finds no credentials.
/// * [`DeployError::CommandFailed`] if an external command exits non-zero.
/// * I/O errors while creating directories or writing the settings/overlay files.
pub async fn deploy(
    runner: &impl CommandRunner,
    store: &impl ConfigStore,
    fs: &impl LocalFs,
    auth: &RegistryAuthChecker<impl CredentialCheck, impl CredentialCheck>,
    reporter: &impl ProgressReporter,
    mode: RunMode,
    config: &DeployConfig,
) -> Result<DeployOutcome> {
    tracing::info!(?mode, image = %config.image, "deploy starting");
    check_dependencies(runner).await?;

    for dir in [&config.config_dir, &config.workspace_dir] {
        fs.create_dir_all(dir)?;
    }

    let overlay_path = write_overlay(fs, reporter, config)?;
    persist_settings(store, reporter, config)?;

    if mode.builds() {
        build_phase(runner, auth, reporter, config).await?;
        if !mode.launches() {
            return Ok(DeployOutcome::Built {
                image: config.image.clone(),
            });
        }
    }

    if mode.pulls() {
        run_step(
            runner,
            reporter,
            &format!("Pulling {}...", config.image),
            "docker pull",
            &["pull", &config.image],
        )
        .await?;
    }

    let compose = compose_args(&config.compose_file(), overlay_path.as_deref());

    // Onboarding is interactive; it owns the terminal until the operator finishes.
    let mut onboard = compose.clone();
    onboard.extend(
        ["run", "--rm", CLI_SERVICE, "onboard", "--no-install-daemon"].map(String::from),
    );
    run_step(
        runner,
        reporter,
        "Starting onboarding...",
        "onboarding",
        &as_strs(&onboard),
    )
    .await?;
    print_provider_hints(reporter, &compose);

    let mut start = compose.clone();
    start.extend(["up", "-d", GATEWAY_SERVICE].map(String::from));
    run_step(
        runner,
        reporter,
        "Starting gateway...",
        "docker compose up",
        &as_strs(&start),
    )
    .await?;
    reporter.success(&format!("{GATEWAY_SERVICE} is running"));

    Ok(DeployOutcome::Started {
        image: config.image.clone(),
        compose: command_line(&compose),
        overlay: overlay_path,
    })
}

// ── Phases ────────────────────────────────────────────────────────────────────

/// Fail before any state is touched if the docker CLI or its compose plugin is absent.
async fn check_dependencies(runner: &impl CommandRunner) -> Result<()> {
    let probes: [(&[&str], &str, &str); 2] = [
        (
            &["--version"],
            "docker",
            "Install Docker: https://docs.docker.com/get-docker/",
        ),
        (
            &["compose", "version"],
            "docker compose",
            "Install the Docker Compose plugin: https://docs.docker.com/compose/install/",
        ),
    ];
    for (args, tool, hint) in probes {
        let found = match runner.run(DOCKER, args).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::debug!(tool, error = %e, "dependency probe failed to spawn");
                false
            }
        };
        if !found {
            return Err(DeployError::MissingDependency {
                tool: tool.to_string(),
                hint: hint.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Write the compose overlay when a home volume or extra mounts are set.
fn write_overlay(
    fs: &impl LocalFs,
    reporter: &impl ProgressReporter,
    config: &DeployConfig,
) -> Result<Option<PathBuf>> {
    let mounts = config.mounts();
    let config_dir = config.config_dir.display().to_string();
    let workspace_dir = config.workspace_dir.display().to_string();
    let Some(document) =
        overlay::synthesize(config.home_volume(), &mounts, &config_dir, &workspace_dir)
    else {
        return Ok(None);
    };

    if let Some(home) = config.home_volume().filter(|h| !overlay::is_named_volume(h))
        && !fs.exists(Path::new(home))
    {
        reporter.warn(&format!(
            "Home volume {home} does not exist; docker will create it owned by root"
        ));
    }

    let path = config.project_dir.join(OVERLAY_FILE);
    let yaml = document.to_yaml().context("cannot serialize compose overlay")?;
    fs.write_atomic(&path, &yaml)?;
    tracing::debug!(path = %path.display(), mounts = mounts.len(), "compose overlay written");
    reporter.success(&format!("Wrote {}", path.display()));
    Ok(Some(path))
}

fn persist_settings(
    store: &impl ConfigStore,
    reporter: &impl ProgressReporter,
    config: &DeployConfig,
) -> Result<()> {
    let entries = config.persisted_entries();
    let borrowed: Vec<(&str, &str)> = entries.iter().map(|(k, v)| (*k, v.as_str())).collect();
    store.upsert(&borrowed)?;
    reporter.success(&format!("Saved settings to {}", store.path().display()));
    Ok(())
}

async fn build_phase(
    runner: &impl CommandRunner,
    auth: &RegistryAuthChecker<impl CredentialCheck, impl CredentialCheck>,
    reporter: &impl ProgressReporter,
    config: &DeployConfig,
) -> Result<()> {
    let registry = config.registry();
    reporter.step(&format!("Checking credentials for {registry}..."));
    if !auth.check(&registry).await {
        return Err(DeployError::RegistryAuth { registry }.into());
    }

    let build_arg = format!("{KEY_APT_PACKAGES}={}", config.apt_packages);
    let dockerfile = config.dockerfile().display().to_string();
    let context = config.project_dir.display().to_string();
    run_step(
        runner,
        reporter,
        &format!("Building {}...", config.image),
        "docker build",
        &[
            "build",
            "--build-arg",
            &build_arg,
            "-t",
            &config.image,
            "-f",
            &dockerfile,
            &context,
        ],
    )
    .await?;

    run_step(
        runner,
        reporter,
        &format!("Pushing {}...", config.image),
        "docker push",
        &["push", &config.image],
    )
    .await
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Run `docker <args>` attached to the terminal; non-zero exit is an error.
async fn run_step(
    runner: &impl CommandRunner,
    reporter: &impl ProgressReporter,
    message: &str,
    step: &str,
    args: &[&str],
) -> Result<()> {
    reporter.step(message);
    tracing::debug!(step, ?args, "running docker");
    let status = runner
        .run_status(DOCKER, args)
        .await
        .with_context(|| format!("cannot run {step}"))?;
    if !status.success() {
        return Err(DeployError::CommandFailed {
            step: step.to_string(),
            status: status.to_string(),
            code: status.code(),
        }
        .into());
    }
    Ok(())
}

/// `compose -f <base> [-f <overlay>]` arguments (without the `docker` program).
fn compose_args(compose_file: &Path, overlay: Option<&Path>) -> Vec<String> {
    let mut args = vec![
        "compose".to_string(),
        "-f".to_string(),
        compose_file.display().to_string(),
    ];
    if let Some(path) = overlay {
        args.push("-f".to_string());
        args.push(path.display().to_string());
    }
    args
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

fn command_line(compose: &[String]) -> String {
    format!("{DOCKER} {}", compose.join(" "))
}

fn print_provider_hints(reporter: &impl ProgressReporter, compose: &[String]) {
    let prefix = command_line(compose);
    reporter.info("Provider setup (optional):");
    reporter.info(&format!(
        "  Chat login:     {prefix} run --rm {CLI_SERVICE} providers login"
    ));
    reporter.info(&format!(
        "  Bot token:      {prefix} run --rm {CLI_SERVICE} providers add --provider <name> --token <token>"
    ));
}
