//! Registry coordinates and docker credential-file heuristics.
//!
//! Pure functions only — the caller reads `config.json` and passes its text in.

use std::collections::HashMap;

use serde::Deserialize;

/// Registry used by docker when an image reference has no registry host.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Registry host of an image repository coordinate.
///
/// The first path segment is a registry host when it contains `.` or `:` or
/// is `localhost`; otherwise the image lives on Docker Hub.
#[must_use]
pub fn registry_host(image_repo: &str) -> String {
    match image_repo.split_once('/') {
        Some((first, _)) if first.contains('.') || first.contains(':') || first == "localhost" => {
            first.to_string()
        }
        _ => DEFAULT_REGISTRY.to_string(),
    }
}

/// Subset of `~/.docker/config.json` relevant to credential detection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, serde_json::Value>,
    #[serde(default)]
    creds_store: Option<String>,
    #[serde(default)]
    cred_helpers: HashMap<String, String>,
}

/// Whether a docker `config.json` shows credentials for `registry`.
///
/// A configured credential store or helper counts as credentials without
/// further checks. Otherwise an `auths` entry must name the registry.
/// Unparsable content never shows credentials.
#[must_use]
pub fn docker_config_has_credentials(content: &str, registry: &str) -> bool {
    let Ok(config) = serde_json::from_str::<DockerConfigFile>(content) else {
        return false;
    };
    if config.creds_store.is_some_and(|s| !s.trim().is_empty()) || !config.cred_helpers.is_empty() {
        return true;
    }
    config.auths.keys().any(|key| auth_key_matches(key, registry))
}

/// Compare an `auths` key (often a URL) against a registry host.
fn auth_key_matches(key: &str, registry: &str) -> bool {
    let host = key
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or_default();
    if host == registry {
        return true;
    }
    registry == DEFAULT_REGISTRY && host == "index.docker.io"
}
