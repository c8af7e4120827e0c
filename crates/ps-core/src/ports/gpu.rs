use std::any::Any;
use std::sync::Arc;

use crate::capture::{GpuError, TextureDesc, TextureHandle};

/// A CPU-readable staging copy target created on the device.
pub trait StagingSurface: Send + Sync {
    fn desc(&self) -> &TextureDesc;

    /// Lets the device recover its concrete surface type.
    fn as_any(&self) -> &dyn Any;
}

/// A mapped staging surface.
///
/// `data` starts at row 0; each row begins `row_pitch` bytes after the
/// previous one. The slice is only valid inside the `read_mapped` callback.
#[derive(Debug, Clone, Copy)]
pub struct MappedRegion<'a> {
    pub data: &'a [u8],
    pub row_pitch: usize,
}

/// The graphics device shared with the host renderer.
///
/// Only called from the render thread, except `add_ref`/`release` which the
/// device must allow from any thread.
///
/// 与宿主渲染器共享的图形设备。
pub trait GpuDevicePort: Send + Sync {
    fn describe(&self, texture: TextureHandle) -> Result<TextureDesc, GpuError>;

    fn create_staging(&self, desc: &TextureDesc) -> Result<Arc<dyn StagingSurface>, GpuError>;

    fn copy_resource(
        &self,
        source: TextureHandle,
        staging: &dyn StagingSurface,
    ) -> Result<(), GpuError>;

    /// Maps `staging` for reading, passes the mapping to `read` and unmaps it
    /// again before returning, whether or not `read` was called.
    fn read_mapped(
        &self,
        staging: &dyn StagingSurface,
        read: &mut dyn FnMut(MappedRegion<'_>),
    ) -> Result<(), GpuError>;

    fn add_ref(&self, texture: TextureHandle);

    fn release(&self, texture: TextureHandle);
}
