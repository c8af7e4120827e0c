//! Captured portrait value objects.

mod image;
mod pose;

pub use image::{PortraitImage, PortraitImageError};
pub use pose::{AmbientLight, DirectionalLight, PortraitPose};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::TextureHandle;
use crate::ids::ClassJobId;

/// Portrait data as exported by the host for one character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortraitData {
    pub pose: PortraitPose,
    pub banner_frame: u16,
    pub banner_decoration: u16,
    pub class_job_id: ClassJobId,
}

/// An immutable captured portrait.
///
/// Values are shared behind `Arc` once published; "modifications" such as
/// attaching the saved image path produce a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPortrait {
    data: PortraitData,
    class_job_abbreviation: String,
    player_name: Option<String>,
    image_path: Option<PathBuf>,
    captured_at: DateTime<Utc>,
    #[serde(skip)]
    source_texture: Option<TextureHandle>,
}

impl CapturedPortrait {
    pub fn new(
        data: PortraitData,
        class_job_abbreviation: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            data,
            class_job_abbreviation: class_job_abbreviation.into(),
            player_name: None,
            image_path: None,
            captured_at,
            source_texture: None,
        }
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }

    /// Attaches the render-thread texture the portrait was shown in.
    pub fn with_source_texture(mut self, texture: TextureHandle) -> Self {
        self.source_texture = Some(texture);
        self
    }

    /// Returns a copy pointing at the saved image file.
    pub fn with_image_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: Some(path.into()),
            ..self.clone()
        }
    }

    pub fn data(&self) -> &PortraitData {
        &self.data
    }

    pub fn pose(&self) -> &PortraitPose {
        &self.data.pose
    }

    pub fn banner_frame(&self) -> u16 {
        self.data.banner_frame
    }

    pub fn banner_decoration(&self) -> u16 {
        self.data.banner_decoration
    }

    pub fn class_job_id(&self) -> ClassJobId {
        self.data.class_job_id
    }

    pub fn class_job_abbreviation(&self) -> &str {
        &self.class_job_abbreviation
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn source_texture(&self) -> Option<TextureHandle> {
        self.source_texture
    }

    /// Adventurer plate portraits are the ones captured from a live texture.
    pub fn is_adventurer_plate(&self) -> bool {
        self.source_texture.is_some()
    }
}
