//! Application service — registry credential detection.
//!
//! Two independent strategies run in order and the first one that finds
//! credentials wins:
//!
//! 1. [`LoginStatusQuery`] asks the container runtime directly.
//! 2. [`CredentialFileHeuristic`] inspects docker's `config.json`.
//!
//! Missing credentials are a normal outcome reported as `false`, never an error.

use std::path::PathBuf;

use crate::application::ports::{AuthEvidence, CommandRunner, CredentialCheck, LocalFs};
use crate::domain::registry::docker_config_has_credentials;

// ── Strategy: login-status query ──────────────────────────────────────────────

/// Runs `docker login --get-login <registry>`; exit 0 means logged in.
pub struct LoginStatusQuery<'a, R> {
    runner: &'a R,
}

impl<'a, R: CommandRunner> LoginStatusQuery<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> CredentialCheck for LoginStatusQuery<'_, R> {
    fn name(&self) -> &'static str {
        "login status"
    }

    async fn probe(&self, registry: &str) -> AuthEvidence {
        match self
            .runner
            .run("docker", &["login", "--get-login", registry])
            .await
        {
            Ok(output) if output.status.success() => AuthEvidence::Authenticated,
            Ok(output) => {
                tracing::debug!(
                    registry,
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "login status query inconclusive"
                );
                AuthEvidence::Inconclusive
            }
            Err(e) => {
                tracing::debug!(registry, error = %e, "login status query could not run");
                AuthEvidence::Inconclusive
            }
        }
    }
}

// ── Strategy: credential file heuristic ───────────────────────────────────────

/// Looks for a credential store, credential helpers or an `auths` entry in
/// docker's `config.json`.
pub struct CredentialFileHeuristic<'a, F> {
    fs: &'a F,
    path: PathBuf,
}

impl<'a, F: LocalFs> CredentialFileHeuristic<'a, F> {
    #[must_use]
    pub fn new(fs: &'a F, path: PathBuf) -> Self {
        Self { fs, path }
    }
}

impl<F: LocalFs> CredentialCheck for CredentialFileHeuristic<'_, F> {
    fn name(&self) -> &'static str {
        "credential file"
    }

    async fn probe(&self, registry: &str) -> AuthEvidence {
        if !self.fs.exists(&self.path) {
            tracing::debug!(path = %self.path.display(), "no docker credential file");
            return AuthEvidence::Inconclusive;
        }
        match self.fs.read_to_string(&self.path) {
            Ok(content) if docker_config_has_credentials(&content, registry) => {
                AuthEvidence::Authenticated
            }
            Ok(_) => AuthEvidence::Inconclusive,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read docker credential file");
                AuthEvidence::Inconclusive
            }
        }
    }
}

// ── Checker ───────────────────────────────────────────────────────────────────

/// Runs the query-based check, then the file heuristic.
pub struct RegistryAuthChecker<Q, H> {
    query: Q,
    heuristic: H,
}

impl<Q: CredentialCheck, H: CredentialCheck> RegistryAuthChecker<Q, H> {
    #[must_use]
    pub fn new(query: Q, heuristic: H) -> Self {
        Self { query, heuristic }
    }

    /// Whether credentials for `registry` are present.
    pub async fn check(&self, registry: &str) -> bool {
        if self.query.probe(registry).await == AuthEvidence::Authenticated {
            tracing::info!(registry, check = self.query.name(), "registry credentials found");
            return true;
        }
        if self.heuristic.probe(registry).await == AuthEvidence::Authenticated {
            tracing::info!(registry, check = self.heuristic.name(), "registry credentials found");
            return true;
        }
        tracing::info!(registry, "no registry credentials found");
        false
    }
}

impl<'a, R: CommandRunner, F: LocalFs>
    RegistryAuthChecker<LoginStatusQuery<'a, R>, CredentialFileHeuristic<'a, F>>
{
    /// Checker wired to the docker CLI and docker's credential file.
    #[must_use]
    pub fn docker(runner: &'a R, fs: &'a F, credentials_file: PathBuf) -> Self {
        Self::new(
            LoginStatusQuery::new(runner),
            CredentialFileHeuristic::new(fs, credentials_file),
        )
    }
}
