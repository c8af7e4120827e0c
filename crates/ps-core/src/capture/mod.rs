//! GPU texture descriptions, retained texture leases and capture errors.

mod error;
mod lease;

pub use error::{CaptureError, GpuError};
pub use lease::TextureLease;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque native texture handle owned by the host renderer.
///
/// The handle is only an address; it is never dereferenced off the render
/// thread. Keeping it alive across threads requires a [`TextureLease`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Returns `None` for a null handle.
    pub fn from_raw(raw: u64) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl Display for TextureHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Pixel layout of a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Bgra8Unorm,
    Rgba8Unorm,
    Bc7Unorm,
    /// Any other native format code.
    Other(u32),
}

impl PixelFormat {
    /// Whether the capture path can read this format back without conversion
    /// beyond a channel swizzle.
    pub fn is_readable(self) -> bool {
        matches!(self, PixelFormat::Bgra8Unorm | PixelFormat::Rgba8Unorm)
    }
}

/// Description of a 2-D texture as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub sample_count: u32,
}

impl TextureDesc {
    /// Tightly packed bytes per row for the 4-byte formats we accept.
    pub fn packed_row_bytes(&self) -> usize {
        self.width as usize * 4
    }

    /// Whether a staging surface created for `self` can also serve `other`.
    pub fn staging_compatible(&self, other: &TextureDesc) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }
}
