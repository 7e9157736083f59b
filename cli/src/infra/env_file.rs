//! Infrastructure implementation of the `ConfigStore` port.
//!
//! `EnvFileStore` keeps the project's `.env` in sync with the resolved
//! settings: the merge itself is `domain::env_file::upsert`, the write is an
//! atomic replace (temp file + rename) so an interrupted run never leaves a
//! truncated file behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ConfigStore;
use crate::domain::env_file;
use crate::infra::fs::write_atomic;

/// `.env` file manager.
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Current file content; a missing file reads as empty.
    fn read(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => {
                Err(e).with_context(|| format!("reading settings file {}", self.path.display()))
            }
        }
    }
}

impl ConfigStore for EnvFileStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<(String, String)>> {
        Ok(env_file::parse(&self.read()?))
    }

    fn upsert(&self, entries: &[(&str, &str)]) -> Result<()> {
        let existing = self.read()?;
        let merged = env_file::upsert(&existing, entries);
        write_atomic(&self.path, &merged)
            .with_context(|| format!("writing settings file {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), keys = entries.len(), "settings persisted");
        Ok(())
    }
}
