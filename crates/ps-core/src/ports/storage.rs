use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::plate::CachedEntry;
use crate::portrait::PortraitImage;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save cancelled")]
    Cancelled,

    #[error("save rejected, {pending} saves already pending")]
    Rejected { pending: usize },

    /// The file was removed while the save was still running.
    #[error("file removed before the save completed")]
    Removed,

    #[error("failed to encode png: {0}")]
    Encode(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PersistError::Cancelled)
    }
}

/// PNG persistence of captured portraits.
#[async_trait]
pub trait PortraitStorePort: Send + Sync {
    /// Writes `image` to `path`. On error the destination does not exist.
    async fn save(&self, image: PortraitImage, path: PathBuf) -> Result<(), PersistError>;

    /// Starts a save in the background without blocking the caller. Failures
    /// are logged.
    fn save_detached(&self, image: PortraitImage, path: PathBuf);

    /// Best-effort delete that never blocks the caller. A missing file is not
    /// an error; failures are logged. A save still running for `path` is
    /// discarded instead of written.
    fn remove(&self, path: &Path);
}

/// Persistence of the plate cache list.
#[async_trait]
pub trait PlateCacheRepositoryPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<Vec<CachedEntry>>;

    async fn save(&self, entries: &[CachedEntry]) -> anyhow::Result<()>;
}
