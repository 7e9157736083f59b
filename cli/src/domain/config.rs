//! Deploy configuration: environment overrides resolved against defaults.
//!
//! Pure functions only — no I/O, no async, no filesystem access. The caller
//! supplies the raw overrides, the home/current directories and a token
//! generator; everything downstream receives the resolved [`DeployConfig`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::error::DeployError;
use crate::domain::mounts::{MountSpec, parse_mounts};
use crate::domain::registry::registry_host;

// ── Constants ────────────────────────────────────────────────────────────────

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "DOCKHAND_";

pub const DEFAULT_IMAGE_REPO: &str = "ghcr.io/dockhand/gateway";
pub const DEFAULT_IMAGE_TAG: &str = "latest";
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;
pub const DEFAULT_BRIDGE_PORT: u16 = 18790;
pub const DEFAULT_GATEWAY_BIND: &str = "lan";

/// Settings file written into the project directory.
pub const ENV_FILE: &str = ".env";
pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const DOCKERFILE: &str = "Dockerfile";

pub const KEY_CONFIG_DIR: &str = "DOCKHAND_CONFIG_DIR";
pub const KEY_WORKSPACE_DIR: &str = "DOCKHAND_WORKSPACE_DIR";
pub const KEY_GATEWAY_PORT: &str = "DOCKHAND_GATEWAY_PORT";
pub const KEY_BRIDGE_PORT: &str = "DOCKHAND_BRIDGE_PORT";
pub const KEY_GATEWAY_BIND: &str = "DOCKHAND_GATEWAY_BIND";
pub const KEY_GATEWAY_TOKEN: &str = "DOCKHAND_GATEWAY_TOKEN";
pub const KEY_IMAGE: &str = "DOCKHAND_IMAGE";
pub const KEY_EXTRA_MOUNTS: &str = "DOCKHAND_EXTRA_MOUNTS";
pub const KEY_HOME_VOLUME: &str = "DOCKHAND_HOME_VOLUME";
pub const KEY_APT_PACKAGES: &str = "DOCKHAND_DOCKER_APT_PACKAGES";

/// Keys persisted to the settings file, in the order they are first written.
pub const PERSISTED_KEYS: [&str; 10] = [
    KEY_CONFIG_DIR,
    KEY_WORKSPACE_DIR,
    KEY_GATEWAY_PORT,
    KEY_BRIDGE_PORT,
    KEY_GATEWAY_BIND,
    KEY_GATEWAY_TOKEN,
    KEY_IMAGE,
    KEY_EXTRA_MOUNTS,
    KEY_HOME_VOLUME,
    KEY_APT_PACKAGES,
];

// ── Raw overrides ────────────────────────────────────────────────────────────

/// `DOCKHAND_*` variables as found in the environment, before defaults.
///
/// Field names map to the upper-cased variable without the prefix, e.g.
/// `image_repo` ← `DOCKHAND_IMAGE_REPO`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvOverrides {
    pub image_repo: Option<String>,
    pub image_tag: Option<String>,
    pub image: Option<String>,
    pub extra_mounts: Option<String>,
    pub home_volume: Option<String>,
    pub gateway_port: Option<String>,
    pub bridge_port: Option<String>,
    pub gateway_bind: Option<String>,
    pub gateway_token: Option<String>,
    pub config_dir: Option<String>,
    pub workspace_dir: Option<String>,
    pub docker_apt_packages: Option<String>,
    pub project_dir: Option<String>,
}

/// Host facts needed to fill in defaults.
pub struct HostContext<'a> {
    /// User home directory.
    pub home: &'a Path,
    /// Directory the command was started from.
    pub cwd: &'a Path,
    /// Value of `DOCKER_CONFIG`, if set.
    pub docker_config: Option<&'a str>,
    /// Gateway token already stored in the settings file, if any.
    pub persisted_token: Option<&'a str>,
}

// ── Resolved configuration ───────────────────────────────────────────────────

/// Effective configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    pub image_repo: String,
    pub image_tag: String,
    /// Full image reference built, pushed and run.
    pub image: String,
    /// Raw comma-delimited mount list, persisted as given.
    pub extra_mounts: String,
    pub home_volume: String,
    pub gateway_port: u16,
    pub bridge_port: u16,
    pub gateway_bind: String,
    pub gateway_token: String,
    pub config_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub apt_packages: String,
    /// Directory holding the compose file, the Dockerfile and `.env`.
    pub project_dir: PathBuf,
    /// Directory holding docker's `config.json`.
    pub docker_config_dir: PathBuf,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A mount list written across several lines is rejoined on one line.
fn normalize_mounts(raw: String) -> String {
    if raw.contains(['\n', '\r']) {
        parse_mounts(&raw)
            .iter()
            .map(MountSpec::as_str)
            .collect::<Vec<_>>()
            .join(",")
    } else {
        raw
    }
}

fn parse_port(key: &str, value: Option<String>, default: u16) -> Result<u16, DeployError> {
    match non_empty(value) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| DeployError::InvalidPort {
            key: key.to_string(),
            value: raw,
        }),
    }
}

impl DeployConfig {
    /// Apply defaults to `overrides`.
    ///
    /// The gateway token comes from the environment, then from the settings
    /// file, and is generated with `generate_token` only when neither has one.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::InvalidPort`] if a port override is not a `u16`,
    /// or [`DeployError::MultilineValue`] if a value to persist spans lines
    /// (a multi-line mount list is first rejoined on one line).
    pub fn resolve(
        overrides: EnvOverrides,
        host: &HostContext<'_>,
        generate_token: impl FnOnce() -> String,
    ) -> Result<Self, DeployError> {
        let image_repo =
            non_empty(overrides.image_repo).unwrap_or_else(|| DEFAULT_IMAGE_REPO.to_string());
        let image_tag =
            non_empty(overrides.image_tag).unwrap_or_else(|| DEFAULT_IMAGE_TAG.to_string());
        let image = non_empty(overrides.image).unwrap_or_else(|| format!("{image_repo}:{image_tag}"));

        let config_dir = non_empty(overrides.config_dir)
            .map_or_else(|| host.home.join(".dockhand"), PathBuf::from);
        let workspace_dir = non_empty(overrides.workspace_dir)
            .map_or_else(|| config_dir.join("workspace"), PathBuf::from);

        let gateway_token = non_empty(overrides.gateway_token)
            .or_else(|| non_empty(host.persisted_token.map(str::to_string)))
            .unwrap_or_else(generate_token);

        let project_dir =
            non_empty(overrides.project_dir).map_or_else(|| host.cwd.to_path_buf(), PathBuf::from);
        let docker_config_dir = host
            .docker_config
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| host.home.join(".docker"), PathBuf::from);

        let config = Self {
            gateway_port: parse_port(KEY_GATEWAY_PORT, overrides.gateway_port, DEFAULT_GATEWAY_PORT)?,
            bridge_port: parse_port(KEY_BRIDGE_PORT, overrides.bridge_port, DEFAULT_BRIDGE_PORT)?,
            gateway_bind: non_empty(overrides.gateway_bind)
                .unwrap_or_else(|| DEFAULT_GATEWAY_BIND.to_string()),
            extra_mounts: normalize_mounts(overrides.extra_mounts.unwrap_or_default()),
            home_volume: overrides.home_volume.unwrap_or_default().trim().to_string(),
            apt_packages: overrides.docker_apt_packages.unwrap_or_default(),
            image_repo,
            image_tag,
            image,
            gateway_token,
            config_dir,
            workspace_dir,
            project_dir,
            docker_config_dir,
        };
        config.reject_line_breaks()?;
        Ok(config)
    }

    /// Every persisted value must fit on one `KEY=VALUE` line.
    fn reject_line_breaks(&self) -> Result<(), DeployError> {
        match self
            .persisted_entries()
            .into_iter()
            .find(|(_, value)| value.contains(['\n', '\r']))
        {
            Some((key, _)) => Err(DeployError::MultilineValue {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Registry host the image is pushed to and pulled from.
    #[must_use]
    pub fn registry(&self) -> String {
        registry_host(&self.image)
    }

    /// Extra mounts parsed from the raw list.
    #[must_use]
    pub fn mounts(&self) -> Vec<MountSpec> {
        parse_mounts(&self.extra_mounts)
    }

    /// Home volume, or `None` when unset.
    #[must_use]
    pub fn home_volume(&self) -> Option<&str> {
        (!self.home_volume.is_empty()).then_some(self.home_volume.as_str())
    }

    #[must_use]
    pub fn env_file(&self) -> PathBuf {
        self.project_dir.join(ENV_FILE)
    }

    #[must_use]
    pub fn compose_file(&self) -> PathBuf {
        self.project_dir.join(COMPOSE_FILE)
    }

    #[must_use]
    pub fn dockerfile(&self) -> PathBuf {
        self.project_dir.join(DOCKERFILE)
    }

    /// Docker's credential configuration file.
    #[must_use]
    pub fn docker_credentials_file(&self) -> PathBuf {
        self.docker_config_dir.join("config.json")
    }

    /// `(key, value)` pairs written to the settings file, in [`PERSISTED_KEYS`] order.
    #[must_use]
    pub fn persisted_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            (KEY_CONFIG_DIR, self.config_dir.display().to_string()),
            (KEY_WORKSPACE_DIR, self.workspace_dir.display().to_string()),
            (KEY_GATEWAY_PORT, self.gateway_port.to_string()),
            (KEY_BRIDGE_PORT, self.bridge_port.to_string()),
            (KEY_GATEWAY_BIND, self.gateway_bind.clone()),
            (KEY_GATEWAY_TOKEN, self.gateway_token.clone()),
            (KEY_IMAGE, self.image.clone()),
            (KEY_EXTRA_MOUNTS, self.extra_mounts.clone()),
            (KEY_HOME_VOLUME, self.home_volume.clone()),
            (KEY_APT_PACKAGES, self.apt_packages.clone()),
        ]
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
