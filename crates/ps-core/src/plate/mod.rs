//! Bounded most-recent-first cache of captured adventurer plates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::portrait::CapturedPortrait;

/// Default number of plates kept.
pub const DEFAULT_PLATE_CACHE_CAPACITY: usize = 10;

/// One cached plate capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Identity key; the player name the plate belongs to.
    pub key: String,
    pub image_path: PathBuf,
    pub portrait: CapturedPortrait,
}

impl CachedEntry {
    /// Builds an entry from a saved portrait. Returns `None` when the portrait
    /// has no player name or no image path.
    pub fn from_portrait(portrait: CapturedPortrait) -> Option<Self> {
        let key = portrait.player_name()?.trim().to_string();
        let image_path = portrait.image_path()?.to_path_buf();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key,
            image_path,
            portrait,
        })
    }
}

/// Most-recent-first list with at most one entry per key.
///
/// Mutations return the image files that the removed entries owned; the
/// caller deletes them.
#[derive(Debug, Clone)]
pub struct PlateCache {
    entries: Vec<CachedEntry>,
    capacity: usize,
}

impl PlateCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Rebuilds a cache from a persisted list, keeping the first occurrence of
    /// each key and at most `capacity` entries.
    pub fn from_entries(entries: Vec<CachedEntry>, capacity: usize) -> (Self, Vec<PathBuf>) {
        let mut cache = Self::new(capacity);
        let mut dropped = Vec::new();
        let mut seen = HashSet::new();
        for entry in entries {
            if cache.entries.len() < capacity && !entry.key.is_empty() && seen.insert(entry.key.clone()) {
                cache.entries.push(entry);
            } else {
                dropped.push(entry.image_path);
            }
        }
        let kept = cache.referenced_paths();
        dropped.retain(|path| !kept.contains(path));
        (cache, dropped)
    }

    /// Inserts `entry` at the front, replacing any entry with the same key and
    /// evicting the oldest entries beyond capacity.
    pub fn insert(&mut self, entry: CachedEntry) -> Vec<PathBuf> {
        let mut discarded = Vec::new();
        if entry.key.is_empty() {
            return discarded;
        }

        if let Some(pos) = self.entries.iter().position(|e| e.key == entry.key) {
            let old = self.entries.remove(pos);
            if old.image_path != entry.image_path {
                discarded.push(old.image_path);
            }
        }

        self.entries.insert(0, entry);

        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop() {
                discarded.push(evicted.image_path);
            }
        }
        discarded
    }

    pub fn clear(&mut self) -> Vec<PathBuf> {
        self.entries.drain(..).map(|e| e.image_path).collect()
    }

    pub fn entries(&self) -> &[CachedEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn referenced_paths(&self) -> HashSet<PathBuf> {
        self.entries.iter().map(|e| e.image_path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClassJobId;
    use crate::portrait::{PortraitData, PortraitPose};
    use chrono::Utc;

    fn entry(name: &str, file: &str) -> CachedEntry {
        let data = PortraitData {
            pose: PortraitPose::default(),
            banner_frame: 0,
            banner_decoration: 0,
            class_job_id: ClassJobId::new(24),
        };
        let portrait = CapturedPortrait::new(data, "WHM", Utc::now())
            .with_player_name(name)
            .with_image_path(file);
        CachedEntry::from_portrait(portrait).unwrap()
    }

    #[test]
    fn test_insert_is_most_recent_first() {
        let mut cache = PlateCache::new(10);
        cache.insert(entry("a", "a.png"));
        cache.insert(entry("b", "b.png"));
        let keys: Vec<_> = cache.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_same_key_replaces_and_discards_old_file() {
        let mut cache = PlateCache::new(10);
        cache.insert(entry("a", "a1.png"));
        cache.insert(entry("b", "b.png"));
        let discarded = cache.insert(entry("a", "a2.png"));
        assert_eq!(discarded, vec![PathBuf::from("a1.png")]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entries()[0].image_path, PathBuf::from("a2.png"));
    }

    #[test]
    fn test_eleventh_insert_evicts_oldest() {
        let mut cache = PlateCache::new(DEFAULT_PLATE_CACHE_CAPACITY);
        for i in 0..10 {
            let discarded = cache.insert(entry(&format!("p{i}"), &format!("p{i}.png")));
            assert!(discarded.is_empty());
        }
        let discarded = cache.insert(entry("p10", "p10.png"));
        assert_eq!(discarded, vec![PathBuf::from("p0.png")]);
        assert_eq!(cache.len(), 10);
        assert!(cache.entries().iter().all(|e| e.key != "p0"));
    }

    #[test]
    fn test_portrait_without_name_is_not_cacheable() {
        let data = PortraitData {
            pose: PortraitPose::default(),
            banner_frame: 0,
            banner_decoration: 0,
            class_job_id: ClassJobId::new(24),
        };
        let portrait = CapturedPortrait::new(data, "WHM", Utc::now()).with_image_path("x.png");
        assert!(CachedEntry::from_portrait(portrait).is_none());
    }

    #[test]
    fn test_from_entries_dedupes_and_truncates() {
        let list = vec![
            entry("a", "a2.png"),
            entry("a", "a1.png"),
            entry("b", "b.png"),
            entry("c", "c.png"),
        ];
        let (cache, dropped) = PlateCache::from_entries(list, 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(dropped, vec![PathBuf::from("a1.png"), PathBuf::from("c.png")]);
    }
}
