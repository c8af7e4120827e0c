use serde::{Deserialize, Serialize};

/// Directional light settings of a portrait.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: [u8; 3],
    pub brightness: u8,
    pub vertical_angle: i16,
    pub horizontal_angle: i16,
}

/// Ambient light settings of a portrait.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: [u8; 3],
    pub brightness: u8,
}

/// Camera, pose and lighting parameters exported alongside a portrait.
///
/// Vector components are stored host-side as half floats; they are kept as
/// `f32` here and narrowed again when encoded into a preset string.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortraitPose {
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub image_rotation: i16,
    pub camera_zoom: u8,
    pub banner_timeline: u16,
    pub animation_progress: f32,
    pub expression: u8,
    pub head_direction: [f32; 2],
    pub eye_direction: [f32; 2],
    pub directional_light: DirectionalLight,
    pub ambient_light: AmbientLight,
    pub banner_background: u16,
}
