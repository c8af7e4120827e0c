//! Startup cleanup of portrait cache directories.
//! 启动时清理肖像缓存目录。

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

/// File name prefix of plates saved by older releases directly into the
/// config directory.
pub const LEGACY_PLATE_PREFIX: &str = "adventurer_plate_";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Deletes cache files that are too old or no longer referenced.
pub struct CacheSweeper {
    max_age: Duration,
}

impl CacheSweeper {
    pub fn new(retention_days: u64) -> Self {
        Self {
            max_age: Duration::from_secs(retention_days * 24 * 60 * 60),
        }
    }

    /// Removes every regular file in `dir` that is older than the retention
    /// period or whose name is not among `referenced`. A missing directory is
    /// an empty sweep.
    pub async fn sweep_dir(
        &self,
        dir: &Path,
        referenced: &HashSet<PathBuf>,
        now: SystemTime,
    ) -> Result<SweepReport> {
        let keep: HashSet<OsString> = referenced
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
            .collect();

        let mut report = SweepReport::default();
        let Some(mut entries) = read_dir_if_exists(dir).await? else {
            return Ok(report);
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("read cache dir failed: {}", dir.display()))?
        {
            let path = entry.path();
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Failed to stat cache file");
                    report.failed += 1;
                    continue;
                }
            };

            let stamp = metadata.created().or_else(|_| metadata.modified()).ok();
            let expired = stamp
                .and_then(|t| now.duration_since(t).ok())
                .is_some_and(|age| age > self.max_age);
            let referenced = keep.contains(&entry.file_name());
            if referenced && !expired {
                continue;
            }

            remove(&path, &mut report).await;
        }

        if report.removed > 0 || report.failed > 0 {
            info!(
                dir = %dir.display(),
                removed = report.removed,
                failed = report.failed,
                "Swept portrait cache directory"
            );
        }
        Ok(report)
    }

    /// Removes `adventurer_plate_*.png` files left in `config_dir` by older
    /// releases.
    pub async fn remove_legacy(&self, config_dir: &Path) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        let Some(mut entries) = read_dir_if_exists(config_dir).await? else {
            return Ok(report);
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("read config dir failed: {}", config_dir.display()))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(LEGACY_PLATE_PREFIX) && name.ends_with(".png") {
                remove(&entry.path(), &mut report).await;
            }
        }

        if report.removed > 0 {
            info!(removed = report.removed, "Removed legacy adventurer plate files");
        }
        Ok(report)
    }
}

async fn read_dir_if_exists(dir: &Path) -> Result<Option<fs::ReadDir>> {
    match fs::read_dir(dir).await {
        Ok(entries) => Ok(Some(entries)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("open dir failed: {}", dir.display())),
    }
}

async fn remove(path: &Path, report: &mut SweepReport) {
    match fs::remove_file(path).await {
        Ok(()) => report.removed += 1,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to delete cache file");
            report.failed += 1;
        }
    }
}
