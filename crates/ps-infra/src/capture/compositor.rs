use std::sync::Arc;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use ps_core::ports::{OverlayIconPort, OverlayKind, PortraitCompositorPort};
use ps_core::PortraitImage;
use tracing::{debug, warn};

/// Draws the banner frame and then the decoration over a portrait, each
/// stretched to the portrait's size.
pub struct OverlayCompositor {
    icons: Arc<dyn OverlayIconPort>,
}

impl OverlayCompositor {
    pub fn new(icons: Arc<dyn OverlayIconPort>) -> Self {
        Self { icons }
    }

    fn try_composite(
        &self,
        base: &PortraitImage,
        banner_frame: u16,
        banner_decoration: u16,
    ) -> Result<Option<PortraitImage>> {
        let layers: Vec<RgbaImage> = [
            (OverlayKind::BannerFrame, banner_frame),
            (OverlayKind::BannerDecoration, banner_decoration),
        ]
        .into_iter()
        .filter(|(_, id)| *id != 0)
        .filter_map(|(kind, id)| self.load_layer(kind, id))
        .collect();

        if layers.is_empty() {
            return Ok(None);
        }

        let (width, height) = (base.width(), base.height());
        let mut canvas = to_rgba_image(base.clone())?;
        for layer in layers {
            let layer = if layer.dimensions() == (width, height) {
                layer
            } else {
                imageops::resize(&layer, width, height, FilterType::Triangle)
            };
            imageops::overlay(&mut canvas, &layer, 0, 0);
        }

        let composed = PortraitImage::new(width, height, canvas.into_raw())
            .context("composited image has unexpected size")?;
        Ok(Some(composed))
    }

    fn load_layer(&self, kind: OverlayKind, id: u16) -> Option<RgbaImage> {
        match self.icons.load_overlay(kind, id) {
            Ok(Some(icon)) => match to_rgba_image(icon) {
                Ok(image) => Some(image),
                Err(err) => {
                    warn!(?kind, id, error = %err, "Overlay artwork unusable");
                    None
                }
            },
            Ok(None) => {
                debug!(?kind, id, "No overlay artwork for id");
                None
            }
            Err(err) => {
                warn!(?kind, id, error = %err, "Failed to load overlay artwork");
                None
            }
        }
    }
}

impl PortraitCompositorPort for OverlayCompositor {
    fn composite(
        &self,
        base: PortraitImage,
        banner_frame: u16,
        banner_decoration: u16,
    ) -> PortraitImage {
        match self.try_composite(&base, banner_frame, banner_decoration) {
            Ok(Some(composed)) => composed,
            Ok(None) => base,
            Err(err) => {
                warn!(error = %err, "Overlay compositing failed, keeping bare portrait");
                base
            }
        }
    }
}

pub(crate) fn to_rgba_image(image: PortraitImage) -> Result<RgbaImage> {
    let (width, height) = (image.width(), image.height());
    RgbaImage::from_raw(width, height, image.into_rgba())
        .with_context(|| format!("pixel buffer does not match {width}x{height}"))
}
