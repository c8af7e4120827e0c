//! # Pipeline configuration / 管线配置
//!
//! Data structures for the tunable timings and bounds of the capture
//! pipeline, mapped from TOML. Missing keys take the documented defaults.
//!
//! 捕获管线的可调参数；缺失的键使用默认值。

use serde::{Deserialize, Serialize};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortraitConfig {
    pub capture: CaptureConfig,
    pub duty: DutyConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
}

impl PortraitConfig {
    /// Create PortraitConfig from a parsed TOML document
    /// 从 TOML 值创建 PortraitConfig
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        Ok(toml_value.clone().try_into()?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Wait after a capture request before reading the texture, so the
    /// renderer has presented at least one complete frame.
    pub settle_delay_ms: i64,
    /// GPU work is suppressed this long after the device is lost.
    pub device_cooldown_ms: i64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 200,
            device_cooldown_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyConfig {
    pub fetch_delay_ms: i64,
    pub fetch_queue_capacity: usize,
    pub fetches_per_tick: usize,
}

impl Default for DutyConfig {
    fn default() -> Self {
        Self {
            fetch_delay_ms: 750,
            fetch_queue_capacity: 16,
            fetches_per_tick: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub max_concurrent_saves: usize,
    pub max_pending_saves: usize,
    pub plate_cache_capacity: usize,
    pub retention_days: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_concurrent_saves: 2,
            max_pending_saves: 16,
            plate_cache_capacity: crate::plate::DEFAULT_PLATE_CACHE_CAPACITY,
            retention_days: 7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Host-drawn capture button on the adventurer plate window. Off by
    /// default; capture stays reachable from the plugin window.
    pub show_capture_button_on_plate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_empty_document_uses_defaults() {
        let value: toml::Value = toml::from_str("").unwrap();
        let config = PortraitConfig::from_toml(&value).unwrap();
        assert_eq!(config, PortraitConfig::default());
        assert_eq!(config.duty.fetch_delay_ms, 750);
        assert_eq!(config.duty.fetch_queue_capacity, 16);
        assert_eq!(config.capture.settle_delay_ms, 200);
        assert_eq!(config.storage.max_concurrent_saves, 2);
        assert_eq!(config.storage.plate_cache_capacity, 10);
    }

    #[test]
    fn test_from_toml_partial_section() {
        let value: toml::Value = toml::from_str(
            r#"
            [duty]
            fetches_per_tick = 3

            [ui]
            show_capture_button_on_plate = true
            "#,
        )
        .unwrap();
        let config = PortraitConfig::from_toml(&value).unwrap();
        assert_eq!(config.duty.fetches_per_tick, 3);
        assert_eq!(config.duty.fetch_delay_ms, 750);
        assert!(config.ui.show_capture_button_on_plate);
    }

    #[test]
    fn test_from_toml_rejects_wrong_type() {
        let value: toml::Value = toml::from_str("[duty]\nfetch_delay_ms = \"soon\"").unwrap();
        assert!(PortraitConfig::from_toml(&value).is_err());
    }
}
