//! Environment loading and secret generation for `DeployConfig`.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rand::RngCore as _;
use rand::rngs::OsRng;

use crate::application::ports::ConfigStore;
use crate::domain::config::{
    DeployConfig, ENV_FILE, ENV_PREFIX, EnvOverrides, HostContext, KEY_GATEWAY_TOKEN,
};
use crate::infra::env_file::EnvFileStore;

/// Number of random bytes in a generated gateway token.
pub const TOKEN_BYTES: usize = 32;

/// Read `DOCKHAND_*` overrides from `vars`.
///
/// # Errors
///
/// Returns an error if a variable cannot be deserialized.
pub fn overrides_from_iter(
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<EnvOverrides> {
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .with_context(|| format!("cannot read {ENV_PREFIX}* environment variables"))
}

/// Read `DOCKHAND_*` overrides from the process environment.
///
/// # Errors
///
/// Returns an error if a variable cannot be deserialized.
pub fn overrides_from_env() -> Result<EnvOverrides> {
    overrides_from_iter(prefixed_utf8_vars(std::env::vars_os()))
}

/// `DOCKHAND_*` pairs from `vars`. Other variables are never decoded, so a
/// non UTF-8 entry elsewhere in the environment is harmless; a non UTF-8
/// `DOCKHAND_*` value is skipped with a warning.
pub fn prefixed_utf8_vars(
    vars: impl IntoIterator<Item = (OsString, OsString)>,
) -> Vec<(String, String)> {
    vars.into_iter()
        .filter_map(|(key, value)| {
            let key = key.into_string().ok().filter(|k| k.starts_with(ENV_PREFIX))?;
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    tracing::warn!(key = %key, "ignoring variable with a non UTF-8 value");
                    None
                }
            }
        })
        .collect()
}

/// 32 random bytes from the OS generator, hex encoded (64 characters).
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Encode bytes as lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}

/// Resolve the effective configuration for this process.
///
/// The settings file consulted for a previously generated token is the one in
/// the resolved project directory.
///
/// # Errors
///
/// Returns an error if the home or current directory cannot be determined,
/// the settings file cannot be read, or an override is invalid.
pub fn load_deploy_config(overrides: EnvOverrides) -> Result<DeployConfig> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let docker_config = std::env::var("DOCKER_CONFIG").ok();

    let project_dir = overrides
        .project_dir
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map_or_else(|| cwd.clone(), PathBuf::from);
    let stored = EnvFileStore::new(project_dir.join(ENV_FILE)).load()?;
    let persisted_token = stored
        .iter()
        .find(|(k, _)| k == KEY_GATEWAY_TOKEN)
        .map(|(_, v)| v.as_str());

    let host = HostContext {
        home: &home,
        cwd: &cwd,
        docker_config: docker_config.as_deref(),
        persisted_token,
    };
    Ok(DeployConfig::resolve(overrides, &host, generate_token)?)
}
