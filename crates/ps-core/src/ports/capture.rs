use crate::capture::{CaptureError, TextureHandle};
use crate::portrait::PortraitImage;

/// Synchronous GPU→CPU readback of a texture. Render thread only.
pub trait FrameCapturePort: Send + Sync {
    fn capture(&self, texture: TextureHandle) -> Result<PortraitImage, CaptureError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    BannerFrame,
    BannerDecoration,
}

/// Loads banner frame and decoration artwork from the host's data files.
pub trait OverlayIconPort: Send + Sync {
    /// `Ok(None)` when the id has no artwork.
    fn load_overlay(&self, kind: OverlayKind, id: u16) -> anyhow::Result<Option<PortraitImage>>;
}

/// Draws banner frame and decoration overlays over a captured portrait.
pub trait PortraitCompositorPort: Send + Sync {
    fn composite(&self, base: PortraitImage, banner_frame: u16, banner_decoration: u16)
        -> PortraitImage;
}
