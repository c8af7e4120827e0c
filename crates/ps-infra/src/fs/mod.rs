//! Filesystem adapters: PNG persistence, cache sweeping and the plate index.

mod file_helpers;
mod persister;
mod plate_index;
mod sweeper;

pub use file_helpers::{ensure_dir, safe_delete_file};
pub use persister::AsyncImagePersister;
pub use plate_index::JsonPlateCacheRepository;
pub use sweeper::{CacheSweeper, SweepReport, LEGACY_PLATE_PREFIX};
