//! Texture readback, staging pool and overlay compositing.

mod compositor;
mod frame_capture;
mod staging_pool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use compositor::OverlayCompositor;
pub(crate) use compositor::to_rgba_image;
pub use frame_capture::{repack_rows, FrameCapture};
pub use staging_pool::StagingTexturePool;
