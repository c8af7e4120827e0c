//! Reusable CPU-readable staging surface.
//! 可复用的 CPU 可读暂存纹理。

use std::sync::Arc;

use parking_lot::Mutex;
use ps_core::capture::{GpuError, TextureDesc};
use ps_core::ports::{GpuDevicePort, StagingSurface};
use tracing::debug;

/// Holds at most one staging surface and recreates it only when the
/// requested (width, height, format) changes.
#[derive(Default)]
pub struct StagingTexturePool {
    current: Mutex<Option<Arc<dyn StagingSurface>>>,
}

impl StagingTexturePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a staging surface compatible with `desc`, creating it if needed.
    pub fn acquire(
        &self,
        device: &dyn GpuDevicePort,
        desc: &TextureDesc,
    ) -> Result<Arc<dyn StagingSurface>, GpuError> {
        let mut current = self.current.lock();
        if let Some(surface) = current.as_ref() {
            if surface.desc().staging_compatible(desc) {
                return Ok(surface.clone());
            }
        }

        // Drop the stale surface before allocating its replacement.
        *current = None;
        let staging_desc = TextureDesc {
            sample_count: 1,
            ..*desc
        };
        let surface = device.create_staging(&staging_desc)?;
        debug!(
            width = desc.width,
            height = desc.height,
            format = ?desc.format,
            "Created staging surface"
        );
        *current = Some(surface.clone());
        Ok(surface)
    }

    /// Drops the pooled surface, e.g. after the device was lost.
    pub fn reset(&self) {
        if self.current.lock().take().is_some() {
            debug!("Staging surface released");
        }
    }

    pub fn current_desc(&self) -> Option<TextureDesc> {
        self.current.lock().as_ref().map(|s| *s.desc())
    }
}
