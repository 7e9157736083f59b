//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Deploy errors ─────────────────────────────────────────────────────────────

/// Errors that terminate a deploy run.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("--build-only and --run-only cannot be used together.")]
    ConflictingModes,

    #[error("Missing dependency: {tool}. {hint}")]
    MissingDependency { tool: String, hint: String },

    #[error("Not logged in to {registry}.\n\nRun: docker login {registry}")]
    RegistryAuth { registry: String },

    #[error("{step} failed ({status})")]
    CommandFailed {
        step: String,
        status: String,
        code: Option<i32>,
    },

    #[error("Invalid value for {key}: '{value}' is not a port number")]
    InvalidPort { key: String, value: String },

    #[error("Invalid value for {key}: line breaks cannot be saved to .env")]
    MultilineValue { key: String },
}

impl DeployError {
    /// Process exit code for this error.
    ///
    /// External command failures propagate the child's own exit code; a child
    /// killed by a signal (no code) maps to `1`.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConflictingModes => 2,
            Self::CommandFailed { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            Self::MissingDependency { .. } | Self::RegistryAuth { .. }
            | Self::InvalidPort { .. }
            | Self::MultilineValue { .. } => 1,
        }
    }
}
