//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;
use std::process::{ExitStatus, Output};

use anyhow::Result;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// There is no timeout: onboarding is interactive and may legitimately wait on
/// the operator indefinitely.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program attached to the terminal and return only its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit an informational hint (no side effects).
    fn info(&self, message: &str);
}

// ── State and Filesystem Ports ────────────────────────────────────────────────

/// Persisted `KEY=VALUE` settings file.
pub trait ConfigStore {
    /// Location of the settings file.
    fn path(&self) -> &Path;
    /// Read the stored `(key, value)` pairs. A missing file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    fn load(&self) -> Result<Vec<(String, String)>>;
    /// Merge `entries` into the file and replace it atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    fn upsert(&self, entries: &[(&str, &str)]) -> Result<()>;
}

/// Local filesystem operations used by the deploy flow.
pub trait LocalFs {
    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Create `path` and all missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Replace `path` with `content` via a temporary file and rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()>;
    /// Read a UTF-8 file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

// ── Registry Credential Port ──────────────────────────────────────────────────

/// What a credential check learned about a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvidence {
    /// Credentials are present.
    Authenticated,
    /// This check could not tell; the next one decides.
    Inconclusive,
}

/// One strategy for detecting registry credentials.
///
/// Implementations never fail: any error while probing is `Inconclusive`.
#[allow(async_fn_in_trait)]
pub trait CredentialCheck {
    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;
    /// Probe for credentials for `registry`.
    async fn probe(&self, registry: &str) -> AuthEvidence;
}
