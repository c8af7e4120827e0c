//! Synchronous GPU→CPU readback of a portrait texture.
//! 纹理回读：GPU → CPU。

use std::sync::Arc;

use parking_lot::Mutex;
use ps_core::capture::{CaptureError, GpuError, PixelFormat, TextureDesc, TextureHandle};
use ps_core::ports::{ClockPort, FrameCapturePort, GpuDevicePort, MappedRegion};
use ps_core::PortraitImage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::StagingTexturePool;

/// Reads textures back through a pooled staging surface.
///
/// Captures are serialized. After the device reports removal or reset, the
/// staging surface is dropped and every capture fails fast until the cooldown
/// has elapsed, without touching the device.
pub struct FrameCapture {
    device: Arc<dyn GpuDevicePort>,
    pool: StagingTexturePool,
    clock: Arc<dyn ClockPort>,
    cooldown_ms: i64,
    suppressed_until_ms: Mutex<Option<i64>>,
    capture_lock: Mutex<()>,
    shutdown: CancellationToken,
}

impl FrameCapture {
    pub fn new(
        device: Arc<dyn GpuDevicePort>,
        clock: Arc<dyn ClockPort>,
        cooldown_ms: i64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            device,
            pool: StagingTexturePool::new(),
            clock,
            cooldown_ms,
            suppressed_until_ms: Mutex::new(None),
            capture_lock: Mutex::new(()),
            shutdown,
        }
    }

    pub fn pool(&self) -> &StagingTexturePool {
        &self.pool
    }

    fn try_capture(&self, texture: TextureHandle) -> Result<PortraitImage, CaptureError> {
        if self.shutdown.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        let _serial = self.capture_lock.lock();

        if let Some(remaining_ms) = self.cooldown_remaining() {
            return Err(CaptureError::CoolingDown { remaining_ms });
        }

        let desc = self
            .device
            .describe(texture)
            .map_err(|e| self.device_error(e))?;
        check_readable(&desc)?;

        let staging = self
            .pool
            .acquire(self.device.as_ref(), &desc)
            .map_err(|e| self.device_error(e))?;
        self.device
            .copy_resource(texture, staging.as_ref())
            .map_err(|e| self.device_error(e))?;

        let mut packed = None;
        self.device
            .read_mapped(staging.as_ref(), &mut |region: MappedRegion<'_>| {
                packed = Some(repack_rows(region, desc.width, desc.height));
            })
            .map_err(|e| self.device_error(e))?;
        let mut pixels = packed.ok_or_else(|| {
            CaptureError::Gpu(GpuError::Other("staging surface was not mapped".into()))
        })??;

        if desc.format == PixelFormat::Bgra8Unorm {
            bgra_to_rgba(&mut pixels);
        }

        PortraitImage::new(desc.width, desc.height, pixels)
            .map_err(|e| CaptureError::Gpu(GpuError::Other(e.to_string())))
    }

    fn cooldown_remaining(&self) -> Option<i64> {
        let mut suppressed = self.suppressed_until_ms.lock();
        let until = (*suppressed)?;
        let remaining = until - self.clock.now_ms();
        if remaining > 0 {
            Some(remaining)
        } else {
            *suppressed = None;
            None
        }
    }

    fn device_error(&self, err: GpuError) -> CaptureError {
        if err.is_device_lost() {
            self.pool.reset();
            *self.suppressed_until_ms.lock() = Some(self.clock.now_ms() + self.cooldown_ms);
            CaptureError::DeviceLost(err)
        } else {
            CaptureError::Gpu(err)
        }
    }
}

impl FrameCapturePort for FrameCapture {
    fn capture(&self, texture: TextureHandle) -> Result<PortraitImage, CaptureError> {
        let result = self.try_capture(texture);
        match &result {
            Ok(image) => debug!(
                texture = %texture,
                width = image.width(),
                height = image.height(),
                "Captured texture"
            ),
            Err(err @ (CaptureError::Cancelled | CaptureError::CoolingDown { .. })) => {
                debug!(texture = %texture, reason = %err, "Capture skipped")
            }
            Err(CaptureError::DeviceLost(err)) => warn!(
                texture = %texture,
                error = %err,
                cooldown_ms = self.cooldown_ms,
                "Graphics device lost, suppressing captures"
            ),
            Err(err) => warn!(texture = %texture, error = %err, "Texture capture failed"),
        }
        result
    }
}

fn check_readable(desc: &TextureDesc) -> Result<(), CaptureError> {
    if desc.sample_count > 1 {
        return Err(CaptureError::Multisampled(desc.sample_count));
    }
    if !desc.format.is_readable() {
        return Err(CaptureError::UnsupportedFormat(desc.format));
    }
    Ok(())
}

/// Copies `height` rows of `width` 4-byte pixels out of a mapped region whose
/// rows may be padded, producing a tightly packed buffer.
pub fn repack_rows(region: MappedRegion<'_>, width: u32, height: u32) -> Result<Vec<u8>, CaptureError> {
    let row = width as usize * 4;
    let height = height as usize;
    if region.row_pitch < row {
        return Err(CaptureError::RowPitchTooSmall {
            pitch: region.row_pitch,
            expected: row,
        });
    }
    let needed = match height {
        0 => 0,
        h => region.row_pitch * (h - 1) + row,
    };
    if region.data.len() < needed {
        return Err(CaptureError::TruncatedBuffer {
            actual: region.data.len(),
            expected: needed,
        });
    }

    if region.row_pitch == row {
        return Ok(region.data[..row * height].to_vec());
    }

    let mut packed = Vec::with_capacity(row * height);
    for y in 0..height {
        let start = y * region.row_pitch;
        packed.extend_from_slice(&region.data[start..start + row]);
    }
    Ok(packed)
}

fn bgra_to_rgba(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}
