use std::path::PathBuf;

use anyhow::Context;

/// Directory name used under the platform config directory when the host
/// does not supply one.
pub const DEFAULT_DIR_NAME: &str = "PortraitStealer";

/// The host's plugin config directory, or `<platform config dir>/PortraitStealer`.
pub fn resolve_config_dir(host_dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = host_dir {
        return Ok(dir);
    }
    let base = dirs::config_dir().context("Failed to determine platform config directory")?;
    Ok(base.join(DEFAULT_DIR_NAME))
}
