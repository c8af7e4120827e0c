pub mod capture;
pub mod fs;
pub mod jobs;
pub mod time;

pub use capture::{FrameCapture, OverlayCompositor, StagingTexturePool};
pub use fs::{AsyncImagePersister, CacheSweeper, JsonPlateCacheRepository};
pub use jobs::CachingJobCatalog;
pub use time::SystemClock;
