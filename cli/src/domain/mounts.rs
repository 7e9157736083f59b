//! Extra mount descriptors supplied through `DOCKHAND_EXTRA_MOUNTS`.

use std::fmt;

/// Separator between descriptors in the raw list.
pub const MOUNT_DELIMITER: char = ',';

/// One compose volume entry, e.g. `/srv/models:/models:ro` or `cache:/cache`.
///
/// Always non-empty and trimmed; the content is otherwise passed to compose
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec(String);

impl MountSpec {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a comma-delimited list into mount specs, trimming each piece and
/// dropping the empty ones. Order is kept.
#[must_use]
pub fn parse_mounts(raw: &str) -> Vec<MountSpec> {
    raw.split(MOUNT_DELIMITER)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| MountSpec(piece.to_string()))
        .collect()
}
