//! Shareable preset strings.
//!
//! A preset is a fixed 58-byte little-endian record describing a portrait's
//! camera, pose, lighting and banner decoration, encoded as standard base64.
//! The layout is shared with other portrait tools and must not change.
//!
//! 预设字符串：固定 58 字节小端记录，Base64 编码。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::{Buf, BufMut};
use half::f16;
use thiserror::Error;

use crate::portrait::{AmbientLight, CapturedPortrait, DirectionalLight, PortraitPose};

pub const PRESET_MAGIC: u32 = 0x5350_5448;
pub const PRESET_VERSION: u16 = 1;
pub const PRESET_LEN: usize = 58;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("preset is not valid base64: {0}")]
    Base64(String),

    #[error("preset is {0} bytes, expected {PRESET_LEN}")]
    Length(usize),

    #[error("unexpected preset magic {0:#010x}")]
    Magic(u32),

    #[error("unsupported preset version {0}")]
    Version(u16),
}

/// The fields carried by a preset string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preset {
    pub pose: PortraitPose,
    pub banner_frame: u16,
    pub banner_decoration: u16,
}

impl Preset {
    pub fn from_portrait(portrait: &CapturedPortrait) -> Self {
        Self {
            pose: *portrait.pose(),
            banner_frame: portrait.banner_frame(),
            banner_decoration: portrait.banner_decoration(),
        }
    }
}

pub fn encode_preset(portrait: &CapturedPortrait) -> String {
    STANDARD.encode(encode_bytes(&Preset::from_portrait(portrait)))
}

pub fn decode_preset(encoded: &str) -> Result<Preset, PresetError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| PresetError::Base64(e.to_string()))?;
    decode_bytes(&bytes)
}

pub fn encode_bytes(preset: &Preset) -> Vec<u8> {
    let pose = &preset.pose;
    let mut buf = Vec::with_capacity(PRESET_LEN);

    buf.put_u32_le(PRESET_MAGIC);
    buf.put_u16_le(PRESET_VERSION);
    put_vec4(&mut buf, pose.camera_position);
    put_vec4(&mut buf, pose.camera_target);
    buf.put_i16_le(pose.image_rotation);
    buf.put_u8(pose.camera_zoom);
    buf.put_u16_le(pose.banner_timeline);
    buf.put_f32_le(pose.animation_progress);
    buf.put_u8(pose.expression);
    put_vec2(&mut buf, pose.head_direction);
    put_vec2(&mut buf, pose.eye_direction);
    buf.put_slice(&pose.directional_light.color);
    buf.put_u8(pose.directional_light.brightness);
    buf.put_i16_le(pose.directional_light.vertical_angle);
    buf.put_i16_le(pose.directional_light.horizontal_angle);
    buf.put_slice(&pose.ambient_light.color);
    buf.put_u8(pose.ambient_light.brightness);
    buf.put_u16_le(pose.banner_background);
    buf.put_u16_le(preset.banner_frame);
    buf.put_u16_le(preset.banner_decoration);

    debug_assert_eq!(buf.len(), PRESET_LEN);
    buf
}

pub fn decode_bytes(mut bytes: &[u8]) -> Result<Preset, PresetError> {
    if bytes.len() != PRESET_LEN {
        return Err(PresetError::Length(bytes.len()));
    }
    let magic = bytes.get_u32_le();
    if magic != PRESET_MAGIC {
        return Err(PresetError::Magic(magic));
    }
    let version = bytes.get_u16_le();
    if version != PRESET_VERSION {
        return Err(PresetError::Version(version));
    }

    let camera_position = get_vec4(&mut bytes);
    let camera_target = get_vec4(&mut bytes);
    let image_rotation = bytes.get_i16_le();
    let camera_zoom = bytes.get_u8();
    let banner_timeline = bytes.get_u16_le();
    let animation_progress = bytes.get_f32_le();
    let expression = bytes.get_u8();
    let head_direction = get_vec2(&mut bytes);
    let eye_direction = get_vec2(&mut bytes);
    let directional_light = DirectionalLight {
        color: [bytes.get_u8(), bytes.get_u8(), bytes.get_u8()],
        brightness: bytes.get_u8(),
        vertical_angle: bytes.get_i16_le(),
        horizontal_angle: bytes.get_i16_le(),
    };
    let ambient_light = AmbientLight {
        color: [bytes.get_u8(), bytes.get_u8(), bytes.get_u8()],
        brightness: bytes.get_u8(),
    };
    let banner_background = bytes.get_u16_le();
    let banner_frame = bytes.get_u16_le();
    let banner_decoration = bytes.get_u16_le();

    Ok(Preset {
        pose: PortraitPose {
            camera_position,
            camera_target,
            image_rotation,
            camera_zoom,
            banner_timeline,
            animation_progress,
            expression,
            head_direction,
            eye_direction,
            directional_light,
            ambient_light,
            banner_background,
        },
        banner_frame,
        banner_decoration,
    })
}

// The host stores positions as 4-component half vectors; w is always 1.
fn put_vec4(buf: &mut Vec<u8>, v: [f32; 3]) {
    for c in v {
        buf.put_u16_le(f16::from_f32(c).to_bits());
    }
    buf.put_u16_le(f16::ONE.to_bits());
}

fn put_vec2(buf: &mut Vec<u8>, v: [f32; 2]) {
    for c in v {
        buf.put_u16_le(f16::from_f32(c).to_bits());
    }
}

fn get_half(bytes: &mut &[u8]) -> f32 {
    f16::from_bits(bytes.get_u16_le()).to_f32()
}

fn get_vec4(bytes: &mut &[u8]) -> [f32; 3] {
    let v = [get_half(bytes), get_half(bytes), get_half(bytes)];
    bytes.advance(2);
    v
}

fn get_vec2(bytes: &mut &[u8]) -> [f32; 2] {
    [get_half(bytes), get_half(bytes)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClassJobId;
    use crate::portrait::PortraitData;
    use chrono::Utc;

    fn portrait() -> CapturedPortrait {
        let pose = PortraitPose {
            camera_position: [1.5, -0.25, 3.0],
            camera_target: [0.0, 1.125, -2.5],
            image_rotation: -90,
            camera_zoom: 42,
            banner_timeline: 1234,
            animation_progress: 0.3731,
            expression: 7,
            head_direction: [0.5, -0.75],
            eye_direction: [-0.125, 0.0625],
            directional_light: DirectionalLight {
                color: [255, 128, 1],
                brightness: 90,
                vertical_angle: -45,
                horizontal_angle: 120,
            },
            ambient_light: AmbientLight {
                color: [10, 20, 30],
                brightness: 60,
            },
            banner_background: 17,
        };
        let data = PortraitData {
            pose,
            banner_frame: 201,
            banner_decoration: 305,
            class_job_id: ClassJobId::new(19),
        };
        CapturedPortrait::new(data, "PLD", Utc::now())
    }

    #[test]
    fn test_encoded_layout_header() {
        let bytes = encode_bytes(&Preset::from_portrait(&portrait()));
        assert_eq!(bytes.len(), PRESET_LEN);
        assert_eq!(&bytes[0..4], &[0x48, 0x54, 0x50, 0x53]);
        assert_eq!(&bytes[4..6], &[1, 0]);
        // w of the camera position
        assert_eq!(&bytes[12..14], &f16::ONE.to_bits().to_le_bytes());
        // frame and decoration close the record
        assert_eq!(&bytes[54..56], &201u16.to_le_bytes());
        assert_eq!(&bytes[56..58], &305u16.to_le_bytes());
    }

    #[test]
    fn test_decode_reproduces_fields() {
        let original = portrait();
        let decoded = decode_preset(&encode_preset(&original)).unwrap();
        assert_eq!(decoded, Preset::from_portrait(&original));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(decode_preset("not base64!"), Err(PresetError::Base64(_))));
        assert_eq!(
            decode_preset(&STANDARD.encode([0u8; 10])),
            Err(PresetError::Length(10))
        );
        let mut bytes = encode_bytes(&Preset::from_portrait(&portrait()));
        bytes[4] = 2;
        assert_eq!(decode_bytes(&bytes), Err(PresetError::Version(2)));
        bytes[0] = 0;
        assert!(matches!(decode_bytes(&bytes), Err(PresetError::Magic(_))));
    }
}
