use thiserror::Error;

use super::PixelFormat;

/// Errors reported by the GPU device port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GpuError {
    #[error("graphics device removed")]
    DeviceRemoved,

    #[error("graphics device reset")]
    DeviceReset,

    #[error("device error: {0}")]
    Other(String),
}

impl GpuError {
    /// Device removal and reset both invalidate every resource created on the device.
    pub fn is_device_lost(&self) -> bool {
        matches!(self, GpuError::DeviceRemoved | GpuError::DeviceReset)
    }
}

/// Why a frame capture produced no image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture cancelled")]
    Cancelled,

    #[error("another capture request is already pending")]
    Busy,

    #[error("gpu work suppressed for another {remaining_ms} ms after device loss")]
    CoolingDown { remaining_ms: i64 },

    #[error("device lost during capture: {0}")]
    DeviceLost(GpuError),

    #[error("unsupported texture format {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("multisampled texture ({0} samples) cannot be read back")]
    Multisampled(u32),

    #[error("row pitch {pitch} is smaller than packed row size {expected}")]
    RowPitchTooSmall { pitch: usize, expected: usize },

    #[error("mapped buffer holds {actual} bytes, expected at least {expected}")]
    TruncatedBuffer { actual: usize, expected: usize },

    #[error("no portrait texture available")]
    TextureUnavailable,

    #[error(transparent)]
    Gpu(GpuError),
}

impl CaptureError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CaptureError::Cancelled)
    }
}
