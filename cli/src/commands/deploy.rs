//! `dockhand` — build, publish and launch the gateway.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::deploy::{self as service, DeployOutcome};
use crate::application::services::registry_auth::RegistryAuthChecker;
use crate::domain::config::DeployConfig;
use crate::domain::mode::RunMode;
use crate::domain::overlay::GATEWAY_SERVICE;
use crate::output::OutputContext;

/// Run the deploy flow for `mode`.
///
/// # Errors
///
/// Returns an error if a dependency is missing, registry credentials are
/// absent, settings cannot be written, or an external command fails.
pub async fn run(mode: RunMode, app: &AppContext) -> Result<()> {
    let reporter = app.terminal_reporter();
    let auth = RegistryAuthChecker::docker(
        &app.runner,
        &app.fs,
        app.config.docker_credentials_file(),
    );

    let outcome = service::deploy(
        &app.runner,
        &app.store,
        &app.fs,
        &auth,
        &reporter,
        mode,
        &app.config,
    )
    .await?;

    match outcome {
        DeployOutcome::Built { image } => print_built(&image, &app.output),
        DeployOutcome::Started { compose, .. } => {
            print_started(&compose, &app.config, &app.output);
        }
    }
    Ok(())
}

/// Print the pushed image reference. In quiet mode only the bare reference
/// is printed so it can be captured by scripts.
fn print_built(image: &str, ctx: &OutputContext) {
    if ctx.quiet {
        println!("{image}");
        return;
    }
    ctx.success("Image built and pushed.");
    ctx.kv("Image", image);
    ctx.command("Run it", "dockhand --run-only");
}

/// Print where things live and how to operate the running gateway.
fn print_started(compose: &str, config: &DeployConfig, ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }
    ctx.header("Gateway");
    ctx.kv("URL", &format!("http://127.0.0.1:{}/", config.gateway_port));
    ctx.kv("Config", &config.config_dir.display().to_string());
    ctx.kv("Workspace", &config.workspace_dir.display().to_string());
    ctx.kv("Token", &config.gateway_token);

    ctx.header("Commands");
    ctx.command("Logs", &format!("{compose} logs -f {GATEWAY_SERVICE}"));
    ctx.command(
        "Health",
        &format!(
            "{compose} exec {GATEWAY_SERVICE} dockhand health --token \"{}\"",
            config.gateway_token
        ),
    );
    ctx.command("Shell", &format!("{compose} exec {GATEWAY_SERVICE} sh"));
}
