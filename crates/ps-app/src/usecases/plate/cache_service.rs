use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use ps_core::ports::{PlateCacheRepositoryPort, PortraitStorePort};
use ps_core::{CachedEntry, CapturedPortrait, PlateCache};
use tracing::{debug, info, warn};

/// Owns the most-recent-first list of captured plates and its on-disk index.
///
/// Files of entries that fall out of the list are deleted immediately; the
/// index is rewritten after every change.
pub struct PlateCacheService {
    cache: Mutex<PlateCache>,
    repository: Arc<dyn PlateCacheRepositoryPort>,
    store: Arc<dyn PortraitStorePort>,
    // Serializes index writes so the last write carries the latest list.
    persist_lock: tokio::sync::Mutex<()>,
}

impl PlateCacheService {
    pub fn new(
        repository: Arc<dyn PlateCacheRepositoryPort>,
        store: Arc<dyn PortraitStorePort>,
        capacity: usize,
    ) -> Self {
        Self {
            cache: Mutex::new(PlateCache::new(capacity)),
            repository,
            store,
            persist_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Restores the list from the index, skipping entries whose image file is
    /// gone. A missing or unreadable index starts an empty list.
    pub async fn load(&self) {
        let stored = match self.repository.load().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "Failed to load plate cache index, starting empty");
                Vec::new()
            }
        };
        let stored_len = stored.len();

        let mut present = Vec::with_capacity(stored_len);
        for entry in stored {
            match tokio::fs::try_exists(&entry.image_path).await {
                Ok(true) => present.push(entry),
                _ => debug!(path = %entry.image_path.display(), "Cached plate image missing"),
            }
        }

        let capacity = self.cache.lock().capacity();
        let (cache, dropped) = PlateCache::from_entries(present, capacity);
        for path in &dropped {
            self.store.remove(path);
        }
        let loaded = cache.len();
        *self.cache.lock() = cache;

        info!(loaded, skipped = stored_len - loaded, "Loaded plate cache");
        if loaded != stored_len {
            self.persist().await;
        }
    }

    /// Puts a saved plate at the front of the list. Returns `false` when the
    /// portrait has no player name or image path.
    pub async fn add(&self, portrait: CapturedPortrait) -> bool {
        let Some(entry) = CachedEntry::from_portrait(portrait) else {
            warn!("Plate capture has no player name or image path, not cached");
            return false;
        };
        let key = entry.key.clone();

        let removed = self.cache.lock().insert(entry);
        for path in &removed {
            self.store.remove(path);
        }
        debug!(key = %key, evicted = removed.len(), "Cached plate capture");

        self.persist().await;
        true
    }

    pub fn entries(&self) -> Vec<CachedEntry> {
        self.cache.lock().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Image files the list currently owns.
    pub fn referenced_paths(&self) -> HashSet<PathBuf> {
        self.cache.lock().referenced_paths()
    }

    /// Empties the list and deletes every cached plate image.
    pub async fn clear(&self) {
        let removed = self.cache.lock().clear();
        for path in &removed {
            self.store.remove(path);
        }
        info!(removed = removed.len(), "Cleared plate cache");
        self.persist().await;
    }

    async fn persist(&self) {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.entries();
        if let Err(err) = self.repository.save(&snapshot).await {
            warn!(error = %err, "Failed to write plate cache index");
        }
    }
}
