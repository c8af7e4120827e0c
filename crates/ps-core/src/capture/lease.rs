use std::fmt;
use std::sync::Arc;

use super::TextureHandle;
use crate::ports::GpuDevicePort;

/// A retained reference to a host texture.
///
/// Creating a lease adds a reference on the device; the reference is released
/// exactly once, either through [`TextureLease::release`] or when the lease is
/// dropped. This lets a capture request carry a texture across threads and
/// through every early return without leaking or double-releasing it.
///
/// 持有宿主纹理的引用；无论从哪条路径退出都只释放一次。
pub struct TextureLease {
    handle: TextureHandle,
    device: Arc<dyn GpuDevicePort>,
    released: bool,
}

impl TextureLease {
    pub fn retain(device: Arc<dyn GpuDevicePort>, handle: TextureHandle) -> Self {
        device.add_ref(handle);
        Self {
            handle,
            device,
            released: false,
        }
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Releases the reference now instead of at drop.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.device.release(self.handle);
        }
    }
}

impl Drop for TextureLease {
    fn drop(&mut self) {
        self.release_once();
    }
}

impl fmt::Debug for TextureLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureLease")
            .field("handle", &self.handle)
            .field("released", &self.released)
            .finish()
    }
}
