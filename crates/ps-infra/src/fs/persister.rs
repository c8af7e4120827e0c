//! Bounded background PNG writer.
//! 有界并发的后台 PNG 写入器。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use parking_lot::Mutex;
use ps_core::ports::{PersistError, PortraitStorePort};
use ps_core::PortraitImage;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use super::safe_delete_file;

/// Writes portraits as PNG files on a tokio runtime.
///
/// At most `max_concurrent` saves encode or write at once; at most
/// `max_pending` saves may be waiting or running, and further saves are
/// rejected instead of queueing. A failed or cancelled save leaves no file
/// behind: data is written to `<path>.tmp` and renamed into place.
///
/// Removing a path whose save is still running marks it instead of deleting
/// it; the save then discards its output, so the file never reappears.
#[derive(Clone)]
pub struct AsyncImagePersister {
    inner: Arc<PersisterInner>,
}

struct PersisterInner {
    runtime: Handle,
    permits: Semaphore,
    max_pending: usize,
    pending: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    /// Paths with a save running, mapped to whether they were removed since.
    saving: Mutex<HashMap<PathBuf, bool>>,
    shutdown: CancellationToken,
}

/// Counts one save against `max_pending` until dropped.
struct PendingSlot(Arc<PersisterInner>);

impl Drop for PendingSlot {
    fn drop(&mut self) {
        self.0.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Registers a path as being saved until released or dropped.
struct PathClaim {
    inner: Arc<PersisterInner>,
    path: PathBuf,
    released: bool,
}

impl PathClaim {
    fn new(inner: Arc<PersisterInner>, path: PathBuf) -> Self {
        inner.saving.lock().insert(path.clone(), false);
        Self {
            inner,
            path,
            released: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn is_removed(&self) -> bool {
        self.inner
            .saving
            .lock()
            .get(&self.path)
            .copied()
            .unwrap_or(false)
    }

    /// Ends the claim and reports whether the path was removed meanwhile.
    fn release(&mut self) -> bool {
        self.released = true;
        self.inner.saving.lock().remove(&self.path).unwrap_or(false)
    }
}

impl Drop for PathClaim {
    fn drop(&mut self) {
        if !self.released {
            self.inner.saving.lock().remove(&self.path);
        }
    }
}

impl AsyncImagePersister {
    pub fn new(
        runtime: Handle,
        max_concurrent: usize,
        max_pending: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(PersisterInner {
                runtime,
                permits: Semaphore::new(max_concurrent),
                max_pending,
                pending: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                saving: Mutex::new(HashMap::new()),
                shutdown,
            }),
        }
    }

    /// Saves waiting for a permit or running.
    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    /// Highest number of saves that ever ran at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak_in_flight.load(Ordering::SeqCst)
    }

    fn reserve(&self) -> Result<PendingSlot, PersistError> {
        let previous = self.inner.pending.fetch_add(1, Ordering::SeqCst);
        if previous >= self.inner.max_pending {
            self.inner.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(PersistError::Rejected { pending: previous });
        }
        Ok(PendingSlot(self.inner.clone()))
    }

    fn claim(&self, path: PathBuf) -> PathClaim {
        PathClaim::new(self.inner.clone(), path)
    }
}

impl PersisterInner {
    async fn save(&self, image: PortraitImage, mut claim: PathClaim) -> Result<(), PersistError> {
        let path = claim.path().to_path_buf();
        if self.shutdown.is_cancelled() {
            return Err(PersistError::Cancelled);
        }

        let _permit = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(PersistError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|_| PersistError::Cancelled)?,
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        let result = self.write_png(image, &claim).await;
        let removed = claim.release();
        match result {
            Ok(()) if removed => {
                safe_delete_file(&path, "portrait removed while saving").await;
                Err(PersistError::Removed)
            }
            Ok(()) => Ok(()),
            Err(err) => {
                safe_delete_file(&tmp_path(&path), "portrait save cleanup").await;
                safe_delete_file(&path, "portrait save cleanup").await;
                Err(err)
            }
        }
    }

    async fn write_png(&self, image: PortraitImage, claim: &PathClaim) -> Result<(), PersistError> {
        let path = claim.path();
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|source| PersistError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let encoded = tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| PersistError::Encode(e.to_string()))??;

        if self.shutdown.is_cancelled() {
            return Err(PersistError::Cancelled);
        }

        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, &encoded)
            .await
            .map_err(|source| PersistError::Io {
                path: tmp.clone(),
                source,
            })?;

        if self.shutdown.is_cancelled() {
            return Err(PersistError::Cancelled);
        }
        if claim.is_removed() {
            return Err(PersistError::Removed);
        }

        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| PersistError::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl PortraitStorePort for AsyncImagePersister {
    async fn save(&self, image: PortraitImage, path: PathBuf) -> Result<(), PersistError> {
        let _slot = self.reserve()?;
        let span = info_span!("infra.persister.save", path = %path.display());
        let claim = self.claim(path);
        self.inner.save(image, claim).instrument(span).await
    }

    fn save_detached(&self, image: PortraitImage, path: PathBuf) {
        let slot = match self.reserve() {
            Ok(slot) => slot,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Dropping portrait save");
                return;
            }
        };

        let span = info_span!("infra.persister.save_detached", path = %path.display());
        let claim = self.claim(path);
        let inner = self.inner.clone();
        self.inner.runtime.spawn(
            async move {
                let _slot = slot;
                match inner.save(image, claim).await {
                    Ok(()) => debug!("Portrait saved"),
                    Err(PersistError::Cancelled) => debug!("Portrait save cancelled"),
                    Err(PersistError::Removed) => debug!("Portrait removed before save completed"),
                    Err(err) => warn!(error = %err, "Portrait save failed"),
                }
            }
            .instrument(span),
        );
    }

    fn remove(&self, path: &Path) {
        if let Some(removed) = self.inner.saving.lock().get_mut(path) {
            *removed = true;
            debug!(path = %path.display(), "Portrait still saving, discarding it");
            return;
        }

        let path = path.to_path_buf();
        self.inner.runtime.spawn(async move {
            safe_delete_file(&path, "portrait cache").await;
        });
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn encode_png(image: &PortraitImage) -> Result<Vec<u8>, PersistError> {
    let mut out = Vec::new();
    PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::Adaptive)
        .write_image(
            image.as_rgba(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| PersistError::Encode(e.to_string()))?;
    Ok(out)
}
