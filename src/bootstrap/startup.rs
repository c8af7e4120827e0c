//! Startup preparation of the portrait cache directories.
//! 启动时准备肖像缓存目录。

use std::collections::HashSet;
use std::time::SystemTime;

use ps_app::PortraitApp;
use ps_infra::fs::ensure_dir;
use ps_infra::CacheSweeper;
use tracing::{info_span, warn, Instrument};

/// Creates the cache directories, restores the plate list and deletes stale
/// files: expired or unindexed plates, every duty slot portrait (no slot
/// record survives a restart) and plates saved by older releases into the
/// config directory. Failures are logged and skipped.
pub async fn prepare_storage(app: &PortraitApp) {
    async {
        let paths = app.paths();
        for dir in [&paths.duty_cache_dir, &paths.plate_dir] {
            if let Err(err) = ensure_dir(dir).await {
                warn!(dir = %dir.display(), error = %err, "Failed to create cache directory");
            }
        }

        app.plates().load().await;

        let sweeper = CacheSweeper::new(app.config().storage.retention_days);
        let now = SystemTime::now();

        let mut keep = app.plates().referenced_paths();
        keep.insert(paths.plate_index_path.clone());
        match sweeper.sweep_dir(&paths.plate_dir, &keep, now).await {
            // Expired plates may still be listed; reloading drops entries whose file is gone.
            Ok(report) if report.removed > 0 => app.plates().load().await,
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Failed to sweep plate cache directory"),
        }

        if let Err(err) = sweeper
            .sweep_dir(&paths.duty_cache_dir, &HashSet::new(), now)
            .await
        {
            warn!(error = %err, "Failed to sweep duty portrait directory");
        }

        if let Err(err) = sweeper.remove_legacy(&paths.config_dir).await {
            warn!(error = %err, "Failed to remove legacy plate files");
        }
    }
    .instrument(info_span!("bootstrap.prepare_storage"))
    .await
}
