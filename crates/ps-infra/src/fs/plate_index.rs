use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ps_core::ports::PlateCacheRepositoryPort;
use ps_core::CachedEntry;
use tokio::fs;

/// Plate cache list stored as a JSON array, most recent first.
pub struct JsonPlateCacheRepository {
    path: PathBuf,
}

impl JsonPlateCacheRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file and renames it over the index, so a crash
    /// leaves either the previous or the new list.
    async fn atomic_write(&self, content: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create plate index dir failed: {}", dir.display()))?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp plate index failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp plate index to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[async_trait]
impl PlateCacheRepositoryPort for JsonPlateCacheRepository {
    async fn load(&self) -> Result<Vec<CachedEntry>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read plate index failed: {}", self.path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("parse plate index failed: {}", self.path.display()))
    }

    async fn save(&self, entries: &[CachedEntry]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(entries).context("serialize plate index failed")?;
        self.atomic_write(&content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ps_core::portrait::{CapturedPortrait, PortraitData, PortraitPose};
    use ps_core::ClassJobId;

    fn entry(name: &str) -> CachedEntry {
        let data = PortraitData {
            pose: PortraitPose::default(),
            banner_frame: 4,
            banner_decoration: 8,
            class_job_id: ClassJobId::new(33),
        };
        let portrait = CapturedPortrait::new(data, "AST", Utc::now())
            .with_player_name(name)
            .with_image_path(format!("/plates/{name}.png"));
        CachedEntry::from_portrait(portrait).unwrap()
    }

    #[tokio::test]
    async fn test_load_missing_index_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let repo = JsonPlateCacheRepository::new(dir.path().join("plates.json"));
        assert!(repo.load().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let repo = JsonPlateCacheRepository::new(dir.path().join("nested").join("plates.json"));
        let entries = vec![entry("Urianger"), entry("Krile")];

        repo.save(&entries).await?;
        let loaded = repo.load().await?;

        assert_eq!(loaded, entries);
        assert!(!repo.path().with_extension("json.tmp").exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_index_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("plates.json");
        std::fs::write(&path, "{ not json")?;
        let repo = JsonPlateCacheRepository::new(path);
        assert!(repo.load().await.is_err());
        Ok(())
    }
}
