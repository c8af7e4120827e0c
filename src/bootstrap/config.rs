//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into PortraitConfig DTO / 将 TOML 解析为 PortraitConfig DTO
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! Missing keys take the defaults declared on the DTO; the loader adds no
//! rules of its own.

use anyhow::Context;
use std::path::{Path, PathBuf};

use ps_core::PortraitConfig;

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
/// - TOML structure is malformed (mapping error)
pub fn load_config(config_path: PathBuf) -> anyhow::Result<PortraitConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    PortraitConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config values in {}", config_path.display()))
}

/// Like [`load_config`], but a config file that does not exist yet yields
/// the defaults.
pub fn load_config_or_default(config_path: &Path) -> anyhow::Result<PortraitConfig> {
    if !config_path.exists() {
        return Ok(PortraitConfig::default());
    }
    load_config(config_path.to_path_buf())
}
