//! Compose overlay synthesis for extra storage mounts.
//!
//! The overlay is merged on top of the project's `docker-compose.yml` with a
//! second `-f` flag. It only ever adds `volumes` entries to the two services
//! and, for a bare home-volume name, declares that name as a managed volume.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::domain::mounts::MountSpec;

/// Long-running gateway service.
pub const GATEWAY_SERVICE: &str = "dockhand-gateway";

/// One-shot CLI service used for onboarding.
pub const CLI_SERVICE: &str = "dockhand-cli";

/// Services that receive the overlay mounts, in emission order.
pub const OVERLAY_SERVICES: [&str; 2] = [GATEWAY_SERVICE, CLI_SERVICE];

/// Home directory of the application user inside the image.
pub const CONTAINER_HOME: &str = "/home/app";

/// Config directory inside the container.
pub const CONTAINER_CONFIG_DIR: &str = "/home/app/.dockhand";

/// Workspace directory inside the container.
pub const CONTAINER_WORKSPACE_DIR: &str = "/home/app/.dockhand/workspace";

/// File name of the overlay next to `docker-compose.yml`.
pub const OVERLAY_FILE: &str = "docker-compose.extra.yml";

/// Volume list for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOverlay {
    pub name: String,
    pub volumes: Vec<String>,
}

/// Typed overlay tree. Serialized once, via [`OverlayDocument::to_yaml`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDocument {
    pub services: Vec<ServiceOverlay>,
    /// Names declared under the top-level `volumes:` key.
    pub named_volumes: Vec<String>,
}

/// Whether a home-volume value names a compose-managed volume rather than a
/// host directory. Anything containing `/` is a host path.
#[must_use]
pub fn is_named_volume(home_volume: &str) -> bool {
    !home_volume.is_empty() && !home_volume.contains('/')
}

/// Build the overlay for `home_volume` and `mounts`.
///
/// Returns `None` when there is nothing to add: no home volume and no mounts.
/// With a home volume, each service gets the home mapping followed by the
/// config and workspace directory mappings, then every mount in input order.
#[must_use]
pub fn synthesize(
    home_volume: Option<&str>,
    mounts: &[MountSpec],
    config_dir: &str,
    workspace_dir: &str,
) -> Option<OverlayDocument> {
    let home_volume = home_volume.map(str::trim).filter(|v| !v.is_empty());
    if home_volume.is_none() && mounts.is_empty() {
        return None;
    }

    let mut volumes = Vec::with_capacity(mounts.len() + 3);
    if let Some(home) = home_volume {
        volumes.push(format!("{home}:{CONTAINER_HOME}"));
        volumes.push(format!("{config_dir}:{CONTAINER_CONFIG_DIR}"));
        volumes.push(format!("{workspace_dir}:{CONTAINER_WORKSPACE_DIR}"));
    }
    volumes.extend(mounts.iter().map(|m| m.as_str().to_string()));

    let services = OVERLAY_SERVICES
        .iter()
        .map(|name| ServiceOverlay {
            name: (*name).to_string(),
            volumes: volumes.clone(),
        })
        .collect();

    let named_volumes = home_volume
        .filter(|home| is_named_volume(home))
        .map(|home| vec![home.to_string()])
        .unwrap_or_default();

    Some(OverlayDocument {
        services,
        named_volumes,
    })
}

impl OverlayDocument {
    /// Render the document as compose YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

// ── Serialization ────────────────────────────────────────────────────────────

impl Serialize for OverlayDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.named_volumes.is_empty() { 1 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("services", &Services(&self.services))?;
        if !self.named_volumes.is_empty() {
            map.serialize_entry("volumes", &NamedVolumes(&self.named_volumes))?;
        }
        map.end()
    }
}

struct Services<'a>(&'a [ServiceOverlay]);

impl Serialize for Services<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for service in self.0 {
            map.serialize_entry(&service.name, &ServiceBody {
                volumes: &service.volumes,
            })?;
        }
        map.end()
    }
}

#[derive(serde::Serialize)]
struct ServiceBody<'a> {
    volumes: &'a [String],
}

struct NamedVolumes<'a>(&'a [String]);

impl Serialize for NamedVolumes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for name in self.0 {
            map.serialize_entry(name, &EmptyMapping)?;
        }
        map.end()
    }
}

/// `{}` — a volume declared with compose defaults.
struct EmptyMapping;

impl Serialize for EmptyMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
