use std::path::{Path, PathBuf};

/// Concrete on-disk locations, all derived from the host's plugin config
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
    pub duty_cache_dir: PathBuf,
    pub plate_dir: PathBuf,
    pub plate_index_path: PathBuf,
    pub logs_dir: PathBuf,
}

impl StoragePaths {
    pub fn from_config_dir(config_dir: &Path) -> Self {
        let plate_dir = config_dir.join("AdventurerPlates");
        Self {
            config_dir: config_dir.to_path_buf(),
            config_path: config_dir.join("config.toml"),
            duty_cache_dir: config_dir.join("CachedPortraits"),
            plate_index_path: plate_dir.join("plates.json"),
            plate_dir,
            logs_dir: config_dir.join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_paths_derive_from_config_dir() {
        let paths = StoragePaths::from_config_dir(Path::new("/tmp/PortraitStealer"));

        assert_eq!(paths.config_path, PathBuf::from("/tmp/PortraitStealer/config.toml"));
        assert_eq!(
            paths.duty_cache_dir,
            PathBuf::from("/tmp/PortraitStealer/CachedPortraits")
        );
        assert_eq!(
            paths.plate_dir,
            PathBuf::from("/tmp/PortraitStealer/AdventurerPlates")
        );
        assert_eq!(
            paths.plate_index_path,
            PathBuf::from("/tmp/PortraitStealer/AdventurerPlates/plates.json")
        );
        assert_eq!(paths.logs_dir, PathBuf::from("/tmp/PortraitStealer/logs"));
    }
}
