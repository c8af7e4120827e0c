use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Deletes `path` if it exists. Never fails; returns whether a file was removed.
///
/// `context` names the caller in the log line.
pub async fn safe_delete_file(path: &Path, context: &str) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), context, "Deleted file");
            true
        }
        Err(err) if err.kind() == ErrorKind::NotFound => false,
        Err(err) => {
            warn!(path = %path.display(), context, error = %err, "Failed to delete file");
            false
        }
    }
}

pub async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("create directory failed: {}", dir.display()))
}
