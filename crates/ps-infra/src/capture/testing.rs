//! In-memory graphics device for exercising the capture path without a GPU.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use ps_core::capture::{GpuError, TextureDesc, TextureHandle};
use ps_core::ports::{GpuDevicePort, MappedRegion, StagingSurface};

struct SoftTexture {
    desc: TextureDesc,
    pixels: Vec<u8>,
    refs: i64,
}

struct SoftStaging {
    desc: TextureDesc,
    row_pitch: usize,
    data: Mutex<Vec<u8>>,
}

impl StagingSurface for SoftStaging {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A device whose textures live in host memory.
///
/// Staging rows are padded by `row_padding` bytes to mimic drivers that align
/// row pitch. Errors can be injected for the next device call.
#[derive(Default)]
pub struct SoftwareGpuDevice {
    textures: Mutex<HashMap<u64, SoftTexture>>,
    next_handle: AtomicU64,
    row_padding: usize,
    pitch_override: Option<usize>,
    fail_next: Mutex<Option<GpuError>>,
    device_calls: AtomicUsize,
    staging_created: AtomicUsize,
    maps: AtomicUsize,
    unmaps: AtomicUsize,
}

impl SoftwareGpuDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_padding(row_padding: usize) -> Self {
        Self {
            row_padding,
            ..Self::default()
        }
    }

    /// Reports `pitch` as the mapped row pitch regardless of the real layout.
    pub fn with_reported_pitch(pitch: usize) -> Self {
        Self {
            pitch_override: Some(pitch),
            ..Self::default()
        }
    }

    /// Registers a texture; `pixels` are tightly packed in `desc.format` order.
    pub fn add_texture(&self, desc: TextureDesc, pixels: Vec<u8>) -> TextureHandle {
        let raw = self.next_handle.fetch_add(1, Ordering::SeqCst) + 0x1000;
        self.textures.lock().insert(
            raw,
            SoftTexture {
                desc,
                pixels,
                refs: 1,
            },
        );
        TextureHandle::from_raw(raw).expect("handles start above zero")
    }

    /// The next device call fails with `error`.
    pub fn fail_next(&self, error: GpuError) {
        *self.fail_next.lock() = Some(error);
    }

    pub fn ref_count(&self, texture: TextureHandle) -> Option<i64> {
        self.textures.lock().get(&texture.as_raw()).map(|t| t.refs)
    }

    pub fn device_calls(&self) -> usize {
        self.device_calls.load(Ordering::SeqCst)
    }

    pub fn staging_created(&self) -> usize {
        self.staging_created.load(Ordering::SeqCst)
    }

    pub fn maps(&self) -> usize {
        self.maps.load(Ordering::SeqCst)
    }

    pub fn unmaps(&self) -> usize {
        self.unmaps.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), GpuError> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn staging<'a>(&self, surface: &'a dyn StagingSurface) -> Result<&'a SoftStaging, GpuError> {
        surface
            .as_any()
            .downcast_ref::<SoftStaging>()
            .ok_or_else(|| GpuError::Other("foreign staging surface".into()))
    }
}

impl GpuDevicePort for SoftwareGpuDevice {
    fn describe(&self, texture: TextureHandle) -> Result<TextureDesc, GpuError> {
        self.enter()?;
        self.textures
            .lock()
            .get(&texture.as_raw())
            .map(|t| t.desc)
            .ok_or_else(|| GpuError::Other(format!("unknown texture {texture}")))
    }

    fn create_staging(&self, desc: &TextureDesc) -> Result<Arc<dyn StagingSurface>, GpuError> {
        self.enter()?;
        self.staging_created.fetch_add(1, Ordering::SeqCst);
        let row_pitch = desc.packed_row_bytes() + self.row_padding;
        Ok(Arc::new(SoftStaging {
            desc: *desc,
            row_pitch,
            data: Mutex::new(vec![0; row_pitch * desc.height as usize]),
        }))
    }

    fn copy_resource(
        &self,
        source: TextureHandle,
        staging: &dyn StagingSurface,
    ) -> Result<(), GpuError> {
        self.enter()?;
        let staging = self.staging(staging)?;
        let textures = self.textures.lock();
        let texture = textures
            .get(&source.as_raw())
            .ok_or_else(|| GpuError::Other(format!("unknown texture {source}")))?;
        let row = texture.desc.packed_row_bytes();
        let mut data = staging.data.lock();
        for (y, src) in texture.pixels.chunks_exact(row).enumerate() {
            let start = y * staging.row_pitch;
            data[start..start + row].copy_from_slice(src);
        }
        Ok(())
    }

    fn read_mapped(
        &self,
        staging: &dyn StagingSurface,
        read: &mut dyn FnMut(MappedRegion<'_>),
    ) -> Result<(), GpuError> {
        self.enter()?;
        let staging = self.staging(staging)?;
        self.maps.fetch_add(1, Ordering::SeqCst);
        {
            let data = staging.data.lock();
            read(MappedRegion {
                data: &data,
                row_pitch: self.pitch_override.unwrap_or(staging.row_pitch),
            });
        }
        self.unmaps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn add_ref(&self, texture: TextureHandle) {
        if let Some(t) = self.textures.lock().get_mut(&texture.as_raw()) {
            t.refs += 1;
        }
    }

    fn release(&self, texture: TextureHandle) {
        if let Some(t) = self.textures.lock().get_mut(&texture.as_raw()) {
            t.refs -= 1;
        }
    }
}
